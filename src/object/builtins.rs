use super::Object;

/// Functions provided by the runtime itself. They resolve like ordinary
/// identifiers once every environment lookup has failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Len,
}

impl Builtin {
    pub fn lookup(name: &str) -> Option<Builtin> {
        match name {
            "len" => Some(Builtin::Len),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Len => "len",
        }
    }

    pub fn apply(&self, args: &[Object]) -> Object {
        match self {
            Builtin::Len => len(args),
        }
    }
}

fn len(args: &[Object]) -> Object {
    if args.len() != 1 {
        return Object::Error(format!(
            "wrong number of arguments: got={}, want=1",
            args.len()
        ));
    }
    match &args[0] {
        Object::Str(value) => Object::Integer(value.len() as i64),
        Object::Array(elements) => Object::Integer(elements.len() as i64),
        other => Object::Error(format!(
            "argument to len not supported: got {}",
            other.type_name()
        )),
    }
}
