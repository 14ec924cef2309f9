//! Command-line tests: drive the built binary over temporary directories.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const LOOP_SOURCE: &str = "for (int i = 0; i < 10; i++) { sum += i; }\n";

fn clonegen(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_clonegen"))
        .args(args)
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .output()
        .expect("failed to run clonegen")
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

/// Sources under `src/`, already parsed into `trees/`.
fn setup_trees() -> TempDir {
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("src");
    fs::create_dir(&src).unwrap();
    fs::write(src.join("loop.cpp"), LOOP_SOURCE).unwrap();
    fs::write(
        src.join("calc.cc"),
        "int add(int a, int b) { return a + b; }\nint main() { int x = 4; x += add(1, 2); return x; }\n",
    )
    .unwrap();
    fs::write(src.join("README.md"), "not a source file").unwrap();

    let output = clonegen(&[
        "parse",
        "--input",
        arg(&src),
        "--output",
        arg(&dir.path().join("trees")),
    ]);
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    dir
}

#[test]
fn list_shows_the_catalogue() {
    let output = clonegen(&["list"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for name in [
        "plus_equal_to_expanded",
        "expanded_to_bitwise_xor_equal",
        "increment_to_assignment",
        "assignment_to_decrement",
        "relational_swap",
        "declaration_split",
        "else_if_to_block",
        "for_to_while",
        "while_to_for",
        "return_type_to_auto",
        "constant_to_expression",
        "identifier_rename",
    ] {
        assert!(stdout.contains(name), "missing {name}");
    }
}

#[test]
fn parse_writes_one_tree_per_source() {
    let dir = setup_trees();
    let trees = dir.path().join("trees");
    assert!(trees.join("loop.cpp.json").exists());
    assert!(trees.join("calc.cc.json").exists());
    assert!(!trees.join("README.md.json").exists());
}

#[test]
fn parse_apply_reconstruct() {
    let dir = setup_trees();
    let rewritten = dir.path().join("rewritten");
    let rebuilt = dir.path().join("rebuilt");

    let output = clonegen(&[
        "apply",
        "--rule",
        "for_to_while",
        "--input",
        arg(&dir.path().join("trees")),
        "--output",
        arg(&rewritten),
    ]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Summary:"));
    assert!(stdout.contains("1 rewritten"));
    assert!(stdout.contains("1 unchanged"));

    let output = clonegen(&[
        "reconstruct",
        "--input",
        arg(&rewritten),
        "--output",
        arg(&rebuilt),
    ]);
    assert!(output.status.success());
    assert_eq!(
        fs::read_to_string(rebuilt.join("loop.cpp")).unwrap(),
        "{ int i = 0 ; while ( i < 10 ) { { sum += i ; } i++ ; } }\n"
    );
    assert_eq!(
        fs::read_to_string(rebuilt.join("calc.cc")).unwrap(),
        fs::read_to_string(dir.path().join("src/calc.cc")).unwrap()
    );
}

#[test]
fn configured_tree_extension_is_used_throughout() {
    let dir = setup_trees();
    let config = dir.path().join("clonegen.toml");
    fs::write(&config, "[pipeline]\nextension = \"cst\"\n").unwrap();
    let src = dir.path().join("src");
    let trees = dir.path().join("cst-trees");
    let rewritten = dir.path().join("rewritten");
    let rebuilt = dir.path().join("rebuilt");

    let steps: [&[&str]; 3] = [
        &["parse", "--input", arg(&src), "--output", arg(&trees)],
        &["apply", "--rule", "for_to_while", "--input", arg(&trees), "--output", arg(&rewritten)],
        &["reconstruct", "--input", arg(&rewritten), "--output", arg(&rebuilt)],
    ];
    for step in steps {
        if step[0] == "reconstruct" {
            fs::write(rewritten.join("stray.json"), "{ not a tree").unwrap();
        }
        let mut args = step.to_vec();
        args.extend(["--config", arg(&config)]);
        let output = clonegen(&args);
        assert!(
            output.status.success(),
            "{}: {}",
            step[0],
            String::from_utf8_lossy(&output.stderr)
        );
    }

    assert!(trees.join("loop.cpp.cst").exists());
    assert!(!trees.join("loop.cpp.json").exists());
    assert_eq!(
        fs::read_to_string(rebuilt.join("loop.cpp")).unwrap(),
        "{ int i = 0 ; while ( i < 10 ) { { sum += i ; } i++ ; } }\n"
    );
    assert!(!rebuilt.join("stray").exists());
}

#[test]
fn unknown_rule_suggests_the_closest_name() {
    let dir = setup_trees();
    let output = clonegen(&[
        "apply",
        "--rule",
        "for_to_whlie",
        "--input",
        arg(&dir.path().join("trees")),
        "--output",
        arg(&dir.path().join("out")),
    ]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("did you mean `for_to_while`"), "{stderr}");
}

#[test]
fn broken_tree_fails_the_batch() {
    let dir = setup_trees();
    let trees = dir.path().join("trees");
    fs::write(trees.join("broken.cpp.json"), "{ not a tree").unwrap();

    let output = clonegen(&[
        "apply",
        "--rule",
        "plus_equal_to_expanded",
        "--input",
        arg(&trees),
        "--output",
        arg(&dir.path().join("out")),
    ]);
    assert_eq!(output.status.code(), Some(1));
    assert!(dir.path().join("out/calc.cc.json").exists());
    assert!(!dir.path().join("out/broken.cpp.json").exists());
}

#[test]
fn pipeline_writes_one_directory_per_rule() {
    let dir = setup_trees();
    let config = dir.path().join("clonegen.toml");
    fs::write(
        &config,
        "[constant]\nseed = 5\n\n[pipeline]\nrules = [\"for_to_while\", \"plus_equal_to_expanded\"]\n",
    )
    .unwrap();
    let out = dir.path().join("out");

    let output = clonegen(&[
        "pipeline",
        "--input",
        arg(&dir.path().join("trees")),
        "--output",
        arg(&out),
        "--config",
        arg(&config),
    ]);
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    for rule in ["for_to_while", "plus_equal_to_expanded"] {
        assert!(out.join(rule).join("loop.cpp.json").exists(), "{rule}");
        assert!(out.join(rule).join("calc.cc.json").exists(), "{rule}");
    }
    assert!(!out.join("while_to_for").exists());
}

#[test]
fn invalid_config_is_rejected() {
    let dir = setup_trees();
    let config = dir.path().join("clonegen.toml");
    fs::write(&config, "[rename]\nsuffix = \"\"\n").unwrap();

    let output = clonegen(&["list", "--config", arg(&config)]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("rename.suffix"), "{stderr}");
}

#[test]
fn rewrite_prints_source_or_diff() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("acc.cpp");
    fs::write(&file, "void f() {\n    total += step;\n}\n").unwrap();

    let output = clonegen(&["rewrite", "--rule", "plus_equal_to_expanded", arg(&file)]);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "void f() {\n    total = total + step;\n}\n"
    );

    let output = clonegen(&[
        "rewrite",
        "--rule",
        "plus_equal_to_expanded",
        "--diff",
        arg(&file),
    ]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("-    total += step;"), "{stdout}");
    assert!(stdout.contains("+    total = total + step;"), "{stdout}");

    // Source file itself is never touched
    assert_eq!(
        fs::read_to_string(&file).unwrap(),
        "void f() {\n    total += step;\n}\n"
    );
}
