use mutative_json_pointer::Path;
use mutative_util::Value;

use crate::types::DraftType;

/// Mutation kind of a recorded entry.
///
/// Which operations are meaningful depends on the target container, see
/// [`Operation::applies_to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Delete,
    Set,
    Add,
    Clear,
    Construct,
    Push,
    Pop,
    Shift,
    Unshift,
    Splice,
}

impl Operation {
    pub const ALL: [Operation; 10] = [
        Operation::Delete,
        Operation::Set,
        Operation::Add,
        Operation::Clear,
        Operation::Construct,
        Operation::Push,
        Operation::Pop,
        Operation::Shift,
        Operation::Unshift,
        Operation::Splice,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Delete => "delete",
            Operation::Set => "set",
            Operation::Add => "add",
            Operation::Clear => "clear",
            Operation::Construct => "construct",
            Operation::Push => "push",
            Operation::Pop => "pop",
            Operation::Shift => "shift",
            Operation::Unshift => "unshift",
            Operation::Splice => "splice",
        }
    }

    pub fn parse(name: &str) -> Option<Operation> {
        Operation::ALL.into_iter().find(|op| op.as_str() == name)
    }

    pub fn applies_to(&self, target: DraftType) -> bool {
        use Operation::*;
        match target {
            DraftType::Object => matches!(self, Delete | Set),
            DraftType::Array => matches!(self, Delete | Set | Push | Pop | Shift | Unshift | Splice),
            DraftType::Map => matches!(self, Delete | Set | Clear | Construct),
            DraftType::Set => matches!(self, Delete | Add | Clear | Construct),
        }
    }

    /// Operations addressing the container itself rather than one of its
    /// members. Array methods address it by the full path; map and set
    /// `clear`/`construct` paths end in a placeholder step that replay drops.
    pub fn is_whole_container(&self) -> bool {
        matches!(
            self,
            Operation::Push
                | Operation::Pop
                | Operation::Shift
                | Operation::Unshift
                | Operation::Splice
                | Operation::Clear
                | Operation::Construct
        )
    }

    /// Native array methods stop after the first path that resolves.
    pub fn is_array_method(&self) -> bool {
        matches!(
            self,
            Operation::Push | Operation::Pop | Operation::Shift | Operation::Unshift | Operation::Splice
        )
    }
}

/// Argument of a recorded entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    /// Used as-is after a deep clone.
    Literal(Value),
    /// Resolved against the draft being replayed.
    Path(Path),
}

impl From<Value> for Arg {
    fn from(value: Value) -> Self {
        Arg::Literal(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedEntry {
    pub target: DraftType,
    pub operation: Operation,
    pub paths: Vec<Path>,
    pub args: Vec<Arg>,
}

impl RecordedEntry {
    pub fn new(target: DraftType, operation: Operation, path: Path, args: Vec<Arg>) -> Self {
        Self {
            target,
            operation,
            paths: vec![path],
            args,
        }
    }
}
