//! Node type tags.
//!
//! The tag set mirrors the node types a Ruby parser produces, plus a few
//! synthesized ones (`attr`, `call`, `autoreturn`, `octal`) that filters use
//! to say exactly what they want emitted. The set is open: a tag the
//! converter does not know is kept as `NodeKind::Custom`, so peripheral
//! filters can introduce private node types and rewrite them away before
//! code generation.

use std::fmt;
use std::sync::Arc;

macro_rules! node_kinds {
    ($($variant:ident => $name:literal,)*) => {
        /// Type tag of a tree node.
        #[derive(Clone, Debug, PartialEq, Eq, Hash)]
        pub enum NodeKind {
            $($variant,)*
            /// A tag outside the built-in set.
            Custom(Arc<str>),
        }

        impl NodeKind {
            /// Every built-in tag, in declaration order.
            pub const BUILTIN: &'static [NodeKind] = &[$(NodeKind::$variant,)*];

            /// The tag as written in s-expressions and JSON.
            pub fn as_str(&self) -> &str {
                match self {
                    $(NodeKind::$variant => $name,)*
                    NodeKind::Custom(name) => name,
                }
            }

            /// Look up a tag by name; unknown names become `Custom`.
            pub fn from_name(name: &str) -> NodeKind {
                match name {
                    $($name => NodeKind::$variant,)*
                    other => NodeKind::Custom(Arc::from(other)),
                }
            }
        }
    };
}

node_kinds! {
    // Literals
    Int => "int",
    Float => "float",
    Str => "str",
    Dstr => "dstr",
    Sym => "sym",
    Dsym => "dsym",
    Nil => "nil",
    True => "true",
    False => "false",
    SelfRef => "self",
    Array => "array",
    Hash => "hash",
    Pair => "pair",
    Splat => "splat",
    Octal => "octal",
    Regexp => "regexp",
    Regopt => "regopt",
    Irange => "irange",
    Erange => "erange",
    Xstr => "xstr",
    FileMacro => "__FILE__",

    // Variables and constants
    Lvar => "lvar",
    Lvasgn => "lvasgn",
    Ivar => "ivar",
    Ivasgn => "ivasgn",
    Gvar => "gvar",
    Gvasgn => "gvasgn",
    Const => "const",
    Cbase => "cbase",
    Casgn => "casgn",
    Masgn => "masgn",
    Mlhs => "mlhs",
    OpAsgn => "op_asgn",
    OrAsgn => "or_asgn",
    AndAsgn => "and_asgn",

    // Calls
    Send => "send",
    Csend => "csend",
    Attr => "attr",
    Call => "call",
    BlockPass => "block_pass",
    Block => "block",
    Args => "args",
    Arg => "arg",
    Optarg => "optarg",
    Restarg => "restarg",
    Blockarg => "blockarg",
    Super => "super",
    Zsuper => "zsuper",

    // Logic and control flow
    And => "and",
    Or => "or",
    Not => "not",
    Begin => "begin",
    Kwbegin => "kwbegin",
    Rescue => "rescue",
    Resbody => "resbody",
    Ensure => "ensure",
    If => "if",
    While => "while",
    Until => "until",
    WhilePost => "while_post",
    UntilPost => "until_post",
    For => "for",
    Next => "next",
    Break => "break",
    Return => "return",
    Autoreturn => "autoreturn",

    // Definitions
    Def => "def",
    Defs => "defs",
    Class => "class",
    Module => "module",
}

impl NodeKind {
    /// Assignment targets that take their value as the last child.
    pub fn is_assignment(&self) -> bool {
        matches!(
            self,
            NodeKind::Lvasgn | NodeKind::Ivasgn | NodeKind::Gvasgn | NodeKind::Casgn
        )
    }

    /// Nodes that open a fresh variable scope.
    pub fn opens_scope(&self) -> bool {
        matches!(
            self,
            NodeKind::Def | NodeKind::Defs | NodeKind::Class | NodeKind::Module
        )
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, NodeKind::Custom(_))
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for NodeKind {
    fn from(name: &str) -> Self {
        NodeKind::from_name(name)
    }
}
