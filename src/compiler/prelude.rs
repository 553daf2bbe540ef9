//! The builtin runtime that generated code can lean on.
//!
//! Block has no methods, so string and container
//! operations are free functions (`strLen`, `listAppend`,
//! `mapGet`, ...) provided by a small Python module. That
//! module is either pasted above the generated code or
//! imported, see [`Prelude`](crate::compiler::config::Prelude).

/// Source of the runtime module.
pub const RUNTIME: &str = include_str!("prelude.py");

/// File name of the runtime module when it is imported.
pub const MODULE_FILE: &str = "block_builtins.py";

/// The line generated code imports the runtime with.
pub const IMPORT: &str = "from block_builtins import *";

/// Prefix given to user names while the prelude is on.
pub const PREFIX: &str = "block_";

/// Names the runtime defines, called as written.
const BUILTINS: &[&str] = &[
    // core
    "echo", "typeOf", "toStr", "toNum", "toBool", "toList", "toTuple", "toSet", "toMap",
    // str
    "strLen", "strToUpper", "strToLower", "strToTitle", "strToCapital", "strSwapCase",
    "strSplit", "strCount", "strEncode", "strStrip", "strLStrip", "strRStrip",
    "strReplace", "strStartsWith", "strEndsWith", "strFind",
    // num
    "numAbs", "numRound", "numFloor", "numCeil", "numTrunc", "numPow", "numSqrt",
    "numClamp", "numSign",
    // list
    "listLen", "listAppend", "listPop", "listExtend", "listContains",
    // tuple
    "tupleLen", "tupleContains",
    // set
    "setAdd", "setRemove", "setContains",
    // map
    "mapGet", "mapSet", "mapKeys", "mapValues", "mapItems",
];

/// Python builtins that stay reachable under the prelude.
const HOST: &[&str] = &[
    "print", "len", "range", "type", "str", "int", "float", "bool", "list", "dict",
    "set", "tuple",
];

/// Block constants, spelled as runtime values.
const CONSTANTS: &[(&str, &str)] =
    &[("true", "boolean(True)"), ("false", "boolean()"), ("none", "NONE")];

/// Whether `name` is called as written rather than
/// prefixed.
pub fn is_builtin(name: &str) -> bool { BUILTINS.contains(&name) || HOST.contains(&name) }

/// How an identifier is spelled while the prelude is on.
pub fn operand(raw: &str) -> String {
    if let Some((_, value)) = CONSTANTS.iter().find(|(name, _)| *name == raw) {
        value.to_string()
    } else if is_builtin(raw) {
        raw.to_string()
    } else {
        format!("{}{}", PREFIX, raw)
    }
}
