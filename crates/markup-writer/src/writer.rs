//! Markup emitter.
//!
//! Walks the element tree with an explicit stack, so documents nested deeper
//! than the call stack allows still serialize.

use markup_parser::{Attributes, Document, Element, ElementValue};

use crate::{WriteError, WriterOptions};

enum Step<'a> {
    Open(&'a Element, usize),
    Close(&'a Element, usize),
}

/// Serializes documents according to [`WriterOptions`].
pub struct Writer {
    options: WriterOptions,
    out: String,
}

impl Writer {
    pub fn new(options: WriterOptions) -> Self {
        Self {
            options,
            out: String::new(),
        }
    }

    /// Write the instructions (if any) followed by the root element.
    pub fn write(mut self, doc: &Document) -> Result<String, WriteError> {
        if !doc.instructions.is_empty() {
            self.out.push_str("<?");
            self.out.push_str(&doc.instructions.target);
            self.attributes(&doc.instructions.target, &doc.instructions.attributes)?;
            self.out.push_str("?>");
            self.newline();
        }

        let mut steps = vec![Step::Open(&doc.root, 0)];
        while let Some(step) = steps.pop() {
            match step {
                Step::Open(el, depth) => {
                    self.indent(depth);
                    self.out.push('<');
                    self.out.push_str(&el.name);
                    self.attributes(&el.name, &el.attributes)?;

                    match &el.value {
                        ElementValue::Empty => {
                            self.out.push_str("/>");
                            self.newline();
                        }
                        ElementValue::Text(text) => {
                            if text.contains(['<', '>']) {
                                return Err(WriteError::BracketInText {
                                    element: el.name.clone(),
                                });
                            }
                            self.out.push('>');
                            self.out.push_str(text);
                            self.close_tag(el);
                            self.newline();
                        }
                        ElementValue::Children(children) => {
                            self.out.push('>');
                            self.newline();
                            steps.push(Step::Close(el, depth));
                            steps.extend(children.iter().rev().map(|c| Step::Open(c, depth + 1)));
                        }
                    }
                }
                Step::Close(el, depth) => {
                    self.indent(depth);
                    self.close_tag(el);
                    self.newline();
                }
            }
        }

        Ok(self.out)
    }

    fn attributes(&mut self, element: &str, attributes: &Attributes) -> Result<(), WriteError> {
        for (key, value) in attributes {
            let quote = match (value.contains('"'), value.contains('\'')) {
                (false, _) => '"',
                (true, false) => '\'',
                (true, true) => {
                    return Err(WriteError::UnquotableAttribute {
                        element: element.to_string(),
                        attribute: key.clone(),
                    });
                }
            };
            self.out.push(' ');
            self.out.push_str(key);
            self.out.push('=');
            self.out.push(quote);
            self.out.push_str(value);
            self.out.push(quote);
        }
        Ok(())
    }

    fn close_tag(&mut self, el: &Element) {
        self.out.push_str("</");
        self.out.push_str(&el.name);
        self.out.push('>');
    }

    fn indent(&mut self, depth: usize) {
        if let Some(width) = self.options.indent {
            self.out.push_str(&" ".repeat(width * depth));
        }
    }

    fn newline(&mut self) {
        if self.options.indent.is_some() {
            self.out.push('\n');
        }
    }
}
