//! Block palette: the catalog of templates users drag onto the canvas.

use crate::error::PaletteError;
use crate::graph::{BlockGraph, BlockId, BlockKind};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A palette entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockTemplate {
    #[serde(rename = "type")]
    pub kind: BlockKind,
    pub text: String,
    pub content: String,
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub description: String,
}

impl BlockTemplate {
    fn new(kind: BlockKind, text: &str, content: &str, template: &str, description: &str) -> Self {
        Self {
            kind,
            text: text.to_string(),
            content: content.to_string(),
            template: Some(template.to_string()),
            description: description.to_string(),
        }
    }

    fn simple(kind: BlockKind, text: &str, content: &str, description: &str) -> Self {
        Self::new(kind, text, content, content, description)
    }
}

/// Package files are either a flat list of templates or categories of templates
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Package {
    Flat(Vec<BlockTemplate>),
    Categories(IndexMap<String, Vec<BlockTemplate>>),
}

/// Ordered categories of block templates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Palette {
    categories: IndexMap<String, Vec<BlockTemplate>>,
}

impl Palette {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stock catalog
    pub fn builtin() -> Self {
        use BlockKind::*;

        let mut palette = Self::new();
        palette.categories.insert(
            "Statements".to_string(),
            vec![
                BlockTemplate::simple(Statement, "Print", "print({value})", "Output text to console."),
                BlockTemplate::simple(Statement, "Assign", "{var} = {value}", "Assign a value to a variable."),
                BlockTemplate::simple(Statement, "Return", "return {value}", "Return a value from a function."),
                BlockTemplate::simple(Statement, "Pass", "pass", "Do nothing. Used as a placeholder."),
                BlockTemplate::simple(Statement, "Break", "break", "Exit a loop immediately."),
                BlockTemplate::simple(Statement, "Continue", "continue", "Skip to the next iteration of a loop."),
            ],
        );
        palette.categories.insert(
            "Control Flow".to_string(),
            vec![
                BlockTemplate::simple(Control, "If", "if {condition}:", "Conditional statement. Executes code if condition is True."),
                BlockTemplate::simple(Control, "Else", "else:", "Optional part of if statement. Executes when if condition is False."),
                BlockTemplate::simple(Control, "Elif", "elif {condition}:", "Else-if statement. Checks another condition if previous if/elif was False."),
            ],
        );
        palette.categories.insert(
            "Loops".to_string(),
            vec![
                BlockTemplate::simple(Loop, "For Loop", "for {item} in {iterable}:", "Loop through items in a sequence."),
                BlockTemplate::simple(Loop, "While Loop", "while {condition}:", "Loop while condition is True."),
            ],
        );
        palette.categories.insert(
            "Functions".to_string(),
            vec![
                BlockTemplate::simple(Defining, "Define Function", "def {name}({params}):", "Define a new function. Set an End Block for the function body."),
                BlockTemplate::simple(FunctionCall, "Call Function", "{name}({args})", "Call (execute) a function."),
                BlockTemplate::simple(FunctionCall, "Lambda", "lambda {params}: {expression}", "Create a small anonymous function."),
            ],
        );
        palette.categories.insert(
            "I/O".to_string(),
            vec![
                BlockTemplate::simple(Io, "Input", "input({prompt})", "Get user input from keyboard."),
                BlockTemplate::simple(Io, "Open File", "open({filename}, {mode})", "Open a file. Modes: 'r' (read), 'w' (write), 'a' (append)."),
            ],
        );
        palette.categories.insert(
            "Variables".to_string(),
            vec![
                BlockTemplate::simple(Variable, "Integer", "int({value})", "Convert value to integer."),
                BlockTemplate::simple(Variable, "Float", "float({value})", "Convert value to floating-point number."),
                BlockTemplate::simple(Variable, "String", "str({value})", "Convert value to string."),
                BlockTemplate::simple(Variable, "List", "list({iterable})", "Create a list from an iterable."),
                BlockTemplate::simple(Variable, "Dict", "dict({mapping})", "Create a dictionary."),
            ],
        );
        palette.categories.insert(
            "Operators".to_string(),
            vec![
                BlockTemplate::simple(Operator, "Add (+)", "{a} + {b}", "Add two values."),
                BlockTemplate::simple(Operator, "Subtract (-)", "{a} - {b}", "Subtract b from a."),
                BlockTemplate::simple(Operator, "Multiply (*)", "{a} * {b}", "Multiply two values."),
                BlockTemplate::simple(Operator, "Divide (/)", "{a} / {b}", "Divide a by b."),
                BlockTemplate::simple(Operator, "Equal (==)", "{a} == {b}", "Check if two values are equal."),
            ],
        );
        palette.categories.insert(
            "Imports".to_string(),
            vec![
                BlockTemplate::simple(Import, "Import", "import {module}", "Import an entire module."),
                BlockTemplate::simple(Import, "From Import", "from {module} import {name}", "Import specific names from a module."),
            ],
        );
        palette.categories.insert(
            "GUI Components".to_string(),
            vec![
                BlockTemplate::new(
                    Gui,
                    "Tkinter Window",
                    "root = tk.Tk()\nroot.title(\"{title}\")\nroot.geometry(\"{size}\")",
                    "root = tk.Tk()",
                    "Create main Tkinter window.",
                ),
                BlockTemplate::new(
                    Class,
                    "Define Class",
                    "class {ClassName}:\n    def __init__(self, root):\n        self.root = root",
                    "class {ClassName}:",
                    "Define a new class. Set an End Block for class body.",
                ),
                BlockTemplate::new(
                    Method,
                    "Define Method",
                    "def {method_name}(self{params}):\n    {body}",
                    "def {method_name}(self):",
                    "Define a method in a class. Set an End Block for method body.",
                ),
            ],
        );
        palette
    }

    pub fn categories(&self) -> impl Iterator<Item = (&str, &[BlockTemplate])> {
        self.categories
            .iter()
            .map(|(name, templates)| (name.as_str(), templates.as_slice()))
    }

    pub fn category(&self, name: &str) -> Option<&[BlockTemplate]> {
        self.categories.get(name).map(Vec::as_slice)
    }

    /// Find a template by its label, searching categories in order
    pub fn find(&self, text: &str) -> Option<&BlockTemplate> {
        self.categories
            .values()
            .flatten()
            .find(|template| template.text == text)
    }

    /// Merge a package file into the palette.
    ///
    /// Returns how many templates were added and the category a flat package
    /// (or the first category of a categorized one) landed in. Templates whose
    /// label already exists in the target category are skipped.
    pub fn merge_package(&mut self, json: &str, category: Option<&str>) -> Result<(usize, String), PaletteError> {
        let package: Package = serde_json::from_str(json)?;

        match package {
            Package::Flat(templates) => {
                let name = category.ok_or(PaletteError::MissingCategory)?.to_string();
                let added = self.add_templates(&name, templates);
                Ok((added, name))
            }
            Package::Categories(groups) => {
                let mut added = 0;
                let mut first_category = None;
                for (index, (key, templates)) in groups.into_iter().enumerate() {
                    let name = match category {
                        Some(category) if index == 0 => category.to_string(),
                        _ => key,
                    };
                    added += self.add_templates(&name, templates);
                    first_category.get_or_insert(name);
                }
                let name = first_category
                    .or_else(|| category.map(str::to_string))
                    .ok_or(PaletteError::MissingCategory)?;
                Ok((added, name))
            }
        }
    }

    fn add_templates(&mut self, category: &str, templates: Vec<BlockTemplate>) -> usize {
        let existing = self.categories.entry(category.to_string()).or_default();
        let mut added = 0;
        for template in templates {
            if existing.iter().any(|t| t.text == template.text) {
                log::debug!("skipping duplicate template '{}' in {}", template.text, category);
                continue;
            }
            existing.push(template);
            added += 1;
        }
        added
    }

    /// Add a block created from `template` to the graph
    pub fn instantiate(graph: &mut BlockGraph, template: &BlockTemplate) -> BlockId {
        let id = graph.add_block(template.kind, template.text.clone(), template.content.clone());
        if let (Some(pattern), Some(block)) = (&template.template, graph.blocks.get_mut(&id)) {
            block.template = Some(pattern.clone());
        }
        id
    }
}

/// `{identifier}` placeholder names in `content`, in order of appearance
pub fn placeholders(content: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = content;

    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        let Some(close) = after.find(|c: char| !(c.is_ascii_alphanumeric() || c == '_')) else {
            break;
        };
        let name = &after[..close];
        let is_identifier = name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
        if is_identifier && after[close..].starts_with('}') {
            names.push(name);
            rest = &after[close + 1..];
        } else {
            rest = after;
        }
    }

    names
}
