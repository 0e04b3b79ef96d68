use super::{MethodSignature, Type};

/// A structural interface: a set of method signatures plus the interfaces it
/// requires. For subtyping, an interface is its flattened method set.
#[derive(Clone, Debug, PartialEq)]
pub struct InterfaceType {
    pub name: Option<String>,
    pub methods: Vec<MethodSignature>,
    pub required: Vec<Type>,
}

impl InterfaceType {
    pub fn new(name: Option<String>, methods: Vec<MethodSignature>, required: Vec<Type>) -> Self {
        InterfaceType {
            name,
            methods,
            required,
        }
    }

    /// All methods, own and required, flattened. Required lists may chain
    /// through named references; a name guard stops runaway cycles.
    pub fn all_methods(&self) -> Vec<MethodSignature> {
        let mut seen_interfaces = Vec::new();
        let mut out = Vec::new();
        self.collect_methods(&mut seen_interfaces, &mut out);
        out
    }

    fn collect_methods(&self, seen: &mut Vec<String>, out: &mut Vec<MethodSignature>) {
        if let Some(name) = &self.name {
            if seen.contains(name) {
                return;
            }
            seen.push(name.clone());
        }

        for method in &self.methods {
            if !out
                .iter()
                .any(|m: &MethodSignature| m.name == method.name && m.signature == method.signature)
            {
                out.push(method.clone());
            }
        }

        for required in &self.required {
            if let Type::Interface(interface) = required.dereference() {
                interface.collect_methods(seen, out);
            }
        }
    }

    pub fn find_methods(&self, name: &str) -> Vec<MethodSignature> {
        self.all_methods()
            .into_iter()
            .filter(|m| m.name == name)
            .collect()
    }
}
