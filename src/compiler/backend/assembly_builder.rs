/// AssemblyIR is the linear item format the builder accumulates before
/// rendering the final assembly text.
enum AssemblyIR {
    /// A finished line of assembly text, emitted verbatim
    Line(String),

    /// Label uses a unique id to bookmark a position; rendered as `Ln:`
    Label(u64),

    /// Comments are purely decorative `#` lines that annotate the
    /// emitted code sections
    Comment(String),
}

/// AssemblyBuilder is a builder utility that accumulates assembly text
/// linearly. It keeps the business logic of generation free from output
/// formatting concerns, and owns the label counter so every minted label
/// is unique within a compilation.
pub struct AssemblyBuilder {
    program_out: Vec<AssemblyIR>,
    label_count: u64,
}

impl AssemblyBuilder {
    pub fn new() -> Self {
        Self {
            program_out: vec![],
            label_count: 0,
        }
    }

    /// Emit one line of assembly text.
    pub fn emit<S: Into<String>>(&mut self, line: S) {
        self.program_out.push(AssemblyIR::Line(line.into()));
    }

    /// Emit a decorative comment line.
    pub fn comment(&mut self, comment: &str) {
        self.program_out.push(AssemblyIR::Comment(comment.to_string()));
    }

    /// Create label generates a new unique label id for branch targets.
    /// ## Typical Usage
    /// let end = builder.create_label();
    /// builder.emit(format!("  jne {}", AssemblyBuilder::label_name(end)));
    /// ... // emit the guarded section
    /// builder.set_label(end);
    pub fn create_label(&mut self) -> u64 {
        let label = self.label_count;
        self.label_count += 1;
        label
    }

    /// Place a previously created label at the current position.
    pub fn set_label(&mut self, label: u64) {
        self.program_out.push(AssemblyIR::Label(label));
    }

    /// Textual name of a label id as branch instructions reference it.
    pub fn label_name(label: u64) -> String {
        format!("L{}", label)
    }

    /// Render all accumulated items into the final assembly text,
    /// consuming the builder in the process.
    pub fn finalize(self) -> String {
        let mut output = String::new();
        for item in &self.program_out {
            match item {
                AssemblyIR::Line(line) => output.push_str(line),
                AssemblyIR::Label(label) => {
                    output.push_str(&Self::label_name(*label));
                    output.push(':');
                }
                AssemblyIR::Comment(comment) => output.push_str(comment),
            }
            output.push('\n');
        }
        output
    }
}
