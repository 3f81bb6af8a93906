//! Compilation options.

/// Settings for one compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Name of the generated class. Every self-referencing call descriptor
    /// uses it, and it is returned as the compiled unit's name.
    pub class_name: String,
    /// Value written to the `.bytecode` directive.
    pub bytecode_version: String,
}

impl CompileOptions {
    /// Options for a class named `class_name` with the default version.
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            ..Self::default()
        }
    }

    pub fn with_bytecode_version(mut self, version: impl Into<String>) -> Self {
        self.bytecode_version = version.into();
        self
    }
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            class_name: "Program".to_string(),
            bytecode_version: "49.0".to_string(),
        }
    }
}
