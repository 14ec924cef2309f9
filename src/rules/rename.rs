//! Identifier renaming.
//!
//! Every `identifier` node gets a fixed suffix unless its name is reserved.
//! Declarations and uses are renamed alike, which keeps a translation unit
//! consistent: the same name always maps to the same new name. Type names
//! and member names are separate node kinds and are not renamed.

use super::{RewriteError, Rule, SynthContext};
use crate::cst::{Cst, NodeId, NodeKind};
use std::collections::HashSet;
use std::sync::Arc;

const KEYWORDS: &[&str] = &[
    "alignas", "alignof", "and", "and_eq", "asm", "auto", "bitand", "bitor", "bool", "break",
    "case", "catch", "char", "char8_t", "char16_t", "char32_t", "class", "compl", "concept",
    "const", "consteval", "constexpr", "constinit", "const_cast", "continue", "co_await",
    "co_return", "co_yield", "decltype", "default", "delete", "do", "double", "dynamic_cast",
    "else", "enum", "explicit", "export", "extern", "false", "float", "for", "friend", "goto",
    "if", "inline", "int", "long", "mutable", "namespace", "new", "noexcept", "not", "not_eq",
    "nullptr", "operator", "or", "or_eq", "private", "protected", "public", "register",
    "reinterpret_cast", "requires", "restrict", "return", "short", "signed", "sizeof", "static",
    "static_assert", "static_cast", "struct", "switch", "template", "this", "thread_local",
    "throw", "true", "try", "typedef", "typeid", "typename", "union", "unsigned", "using",
    "virtual", "void", "volatile", "wchar_t", "while", "xor", "xor_eq", "_Alignas", "_Alignof",
    "_Atomic", "_Bool", "_Complex", "_Generic", "_Imaginary", "_Noreturn", "_Static_assert",
    "_Thread_local",
];

const MACROS: &[&str] = &[
    "NULL", "EOF", "stdin", "stdout", "stderr", "INT_MAX", "INT_MIN", "LLONG_MAX", "LLONG_MIN",
    "UINT_MAX", "CHAR_BIT", "RAND_MAX", "EXIT_SUCCESS", "EXIT_FAILURE", "SIZE_MAX",
];

const C_LIBRARY: &[&str] = &[
    // stdio
    "printf", "fprintf", "sprintf", "snprintf", "vprintf", "vfprintf", "vsprintf", "vsnprintf",
    "scanf", "fscanf", "sscanf", "vscanf", "vfscanf", "vsscanf", "fgetc", "fgets", "fputc",
    "fputs", "getc", "getchar", "gets", "putc", "putchar", "puts", "ungetc", "fread", "fwrite",
    "fopen", "fclose", "fflush", "freopen", "setbuf", "setvbuf", "fseek", "ftell", "rewind",
    "fgetpos", "fsetpos", "clearerr", "feof", "ferror", "perror", "remove", "rename", "tmpfile",
    "tmpnam",
    // stdlib
    "atof", "atoi", "atol", "atoll", "strtod", "strtof", "strtol", "strtold", "strtoll",
    "strtoul", "strtoull", "rand", "srand", "calloc", "free", "malloc", "realloc", "abort",
    "atexit", "exit", "_Exit", "getenv", "system", "bsearch", "qsort", "abs", "div", "labs",
    "ldiv", "llabs", "lldiv", "mblen", "mbtowc", "wctomb", "mbstowcs", "wcstombs",
    // string
    "memcpy", "memmove", "memchr", "memcmp", "memset", "strcat", "strncat", "strchr", "strcmp",
    "strncmp", "strcoll", "strcpy", "strncpy", "strspn", "strcspn", "strerror", "strlen",
    "strpbrk", "strrchr", "strstr", "strtok", "strxfrm",
    // math
    "cos", "sin", "tan", "acos", "asin", "atan", "atan2", "cosh", "sinh", "tanh", "acosh",
    "asinh", "atanh", "exp", "frexp", "ldexp", "log", "log10", "modf", "exp2", "expm1", "log1p",
    "log2", "logb", "pow", "sqrt", "cbrt", "hypot", "erf", "erfc", "lgamma", "tgamma", "ceil",
    "floor", "fmod", "trunc", "round", "lround", "llround", "rint", "lrint", "llrint",
    "nearbyint", "remainder", "remquo", "copysign", "nan", "nextafter", "nexttoward", "fdim",
    "fmax", "fmin", "fabs", "fma",
    // time, ctype, signal, setjmp, assert, errno
    "clock", "difftime", "mktime", "time", "asctime", "ctime", "gmtime", "localtime", "strftime",
    "isalnum", "isalpha", "isblank", "iscntrl", "isdigit", "isgraph", "islower", "isprint",
    "ispunct", "isspace", "isupper", "isxdigit", "tolower", "toupper", "signal", "raise",
    "longjmp", "setjmp", "assert", "errno",
];

const CPP_LIBRARY: &[&str] = &[
    // iostream
    "cin", "cout", "cerr", "clog", "endl", "ends", "flush", "ws", "dec", "hex", "oct", "fixed",
    "scientific", "boolalpha", "noboolalpha", "showbase", "noshowbase", "showpoint",
    "noshowpoint", "showpos", "noshowpos", "skipws", "noskipws", "uppercase", "nouppercase",
    "unitbuf", "nounitbuf", "internal", "left", "right", "setw", "setfill", "setprecision",
    "setiosflags", "resetiosflags", "setbase", "get", "getline", "ignore", "peek", "read",
    "gcount", "seekg", "seekp", "tellg", "tellp", "write", "put", "width", "fill", "precision",
    "flags", "setf", "unsetf", "good", "eof", "fail", "bad", "clear", "sync", "open", "close",
    // containers and strings
    "append", "assign", "at", "back", "begin", "capacity", "cbegin", "cend", "compare", "copy",
    "crbegin", "crend", "c_str", "data", "empty", "end", "erase", "find", "find_first_not_of",
    "find_first_of", "find_last_not_of", "find_last_of", "front", "insert", "length",
    "max_size", "pop_back", "push_back", "rbegin", "rend", "replace", "reserve", "resize",
    "shrink_to_fit", "size", "substr", "swap",
    // algorithm and numeric
    "accumulate", "adjacent_difference", "adjacent_find", "all_of", "any_of", "back_inserter",
    "binary_search", "copy_if", "copy_n", "count", "count_if", "equal", "equal_range",
    "fill_n", "find_if", "find_if_not", "for_each", "front_inserter", "generate", "generate_n",
    "includes", "inplace_merge", "inserter", "is_heap", "is_sorted", "iter_swap",
    "lexicographical_compare", "lower_bound", "make_heap", "max", "max_element", "merge", "min",
    "min_element", "minmax", "minmax_element", "mismatch", "move", "next_permutation",
    "none_of", "nth_element", "partial_sort", "partial_sort_copy", "partition", "pop_heap",
    "prev_permutation", "push_heap", "random_shuffle", "remove_copy", "remove_copy_if",
    "remove_if", "replace_copy", "replace_copy_if", "replace_if", "reverse", "reverse_copy",
    "rotate", "rotate_copy", "search", "search_n", "set_difference", "set_intersection",
    "set_symmetric_difference", "set_union", "shuffle", "sort", "sort_heap",
    "stable_partition", "stable_sort", "swap_ranges", "transform", "unique", "unique_copy",
    "upper_bound",
    // memory
    "allocate", "allocate_shared", "allocator", "construct", "deallocate", "default_delete",
    "destroy", "get_deleter", "get_temporary_buffer", "make_shared", "make_unique",
    "owner_less", "raw_storage_iterator", "return_temporary_buffer", "shared_ptr",
    "unique_ptr", "weak_ptr",
    // functional
    "bind", "function", "hash", "invoke", "is_bind_expression", "is_placeholder", "mem_fn",
    "not1", "not2", "plus", "minus", "multiplies", "divides", "modulus", "negate", "equal_to",
    "not_equal_to", "greater", "less", "greater_equal", "less_equal", "logical_and",
    "logical_or", "logical_not", "bit_and", "bit_or", "bit_xor", "bit_not",
    // thread
    "thread", "mutex", "timed_mutex", "recursive_mutex", "recursive_timed_mutex", "lock_guard",
    "unique_lock", "shared_lock", "condition_variable", "condition_variable_any",
    "notify_all_at_thread_exit", "cv_status", "promise", "packaged_task", "future",
    "shared_future", "async", "launch", "future_status", "future_error", "future_category",
];

/// Names identifier renaming must leave alone.
///
/// Cheap to clone; extending produces a new set and leaves the original
/// untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedNames(Arc<HashSet<String>>);

impl ReservedNames {
    /// Language keywords, common macros and the C and C++ standard library
    /// names a program may call without declaring.
    pub fn standard() -> Self {
        Self::empty().extended(
            KEYWORDS
                .iter()
                .chain(MACROS)
                .chain(C_LIBRARY)
                .chain(CPP_LIBRARY)
                .copied(),
        )
    }

    pub fn empty() -> Self {
        Self(Arc::new(HashSet::new()))
    }

    pub fn with(&self, name: &str) -> Self {
        self.extended([name])
    }

    pub fn extended<I, S>(&self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = (*self.0).clone();
        set.extend(names.into_iter().map(Into::into));
        Self(Arc::new(set))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for ReservedNames {
    fn default() -> Self {
        Self::standard()
    }
}

/// `count` → `count_new`.
pub struct IdentifierRename {
    suffix: String,
    reserved: ReservedNames,
}

impl IdentifierRename {
    pub fn new(suffix: &str, reserved: ReservedNames) -> Self {
        Self {
            suffix: suffix.to_string(),
            reserved,
        }
    }

    /// `std::name` or `std::inner::name`: the name belongs to the standard
    /// library whatever it is.
    fn is_std_qualified(cst: &Cst, node: NodeId) -> bool {
        let mut current = node;
        while let Some(parent) = cst.parent(current) {
            if cst.kind(parent) != &NodeKind::QualifiedIdentifier {
                return false;
            }
            let scope = cst.child(parent, 0);
            if scope.is_some_and(|scope| scope != current && cst.text(scope) == "std") {
                return true;
            }
            current = parent;
        }
        false
    }
}

impl Rule for IdentifierRename {
    fn name(&self) -> &str {
        "identifier_rename"
    }

    fn description(&self) -> &str {
        "Append a suffix to every identifier that is not reserved"
    }

    fn is_match(&self, cst: &Cst, node: NodeId) -> bool {
        cst.kind(node) == &NodeKind::Identifier
            && !self.reserved.contains(cst.text(node))
            && !Self::is_std_qualified(cst, node)
    }

    fn synthesize(
        &self,
        cst: &Cst,
        node: NodeId,
        _cx: &mut SynthContext<'_>,
    ) -> Result<String, RewriteError> {
        Ok(format!("{}{}", cst.text(node), self.suffix))
    }
}
