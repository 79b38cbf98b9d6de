//! Data model for a scanned header, independent of any output format.
//!
//! Records are plain values: the scanner builds each one completely and then
//! moves it into its collection, and nothing is shared between collections.

use crate::scanner::types::normalize_type;
use serde::Serialize;

/// Everything extracted from a single header, in source order.
#[derive(Debug, Default, Serialize)]
pub struct Model {
    pub macros: Vec<Macro>,
    pub structs: Vec<StructDef>,
    /// Typedef'd function-pointer shapes.
    pub callbacks: Vec<FunctionDef>,
    /// Ordinal-bearing exported API functions.
    pub functions: Vec<FunctionDef>,
}

/// A `#define`, possibly spanning several continuation lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Macro {
    /// Canonical `#define NAME VALUE` line. Ends in ` \` when the macro
    /// continues onto `body_lines`.
    pub header_line: String,
    /// Continuation lines; every one but the last ends in ` \`.
    pub body_lines: Vec<String>,
}

impl Macro {
    pub fn is_multiline(&self) -> bool {
        !self.body_lines.is_empty()
    }

    /// Source text of the definition, body lines indented by four spaces.
    pub fn render(&self) -> String {
        let mut out = self.header_line.clone();
        for line in &self.body_lines {
            out.push_str("\n    ");
            out.push_str(line);
        }
        out
    }
}

/// One struct member or function parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Variable {
    /// Canonical type, pointer markers included.
    #[serde(rename = "type")]
    pub ty: String,
    /// Declared name; empty for unnamed parameters. Never starts with `*`.
    pub name: String,
}

impl Variable {
    /// Build a struct member. Array suffixes stay on the name so the
    /// member keeps its size in the emitted layout.
    pub fn member(raw_type: &str, raw_name: &str) -> Self {
        let (ty, name) = fold_pointer_prefix(normalize_type(raw_type), raw_name.trim());
        Variable {
            ty,
            name: name.to_string(),
        }
    }

    /// Build a function parameter. `name[]` decays to a pointer named `name`.
    pub fn param(raw_type: &str, raw_name: &str) -> Self {
        let (mut ty, mut name) = fold_pointer_prefix(normalize_type(raw_type), raw_name.trim());
        if let Some(pos) = name.find('[') {
            ty = add_pointer(&ty, 1);
            name = name[..pos].trim_end();
        }
        Variable {
            ty,
            name: name.to_string(),
        }
    }

    /// `type name`, or just `type` when unnamed.
    pub fn declaration(&self) -> String {
        if self.name.is_empty() {
            self.ty.clone()
        } else {
            format!("{} {}", self.ty, self.name)
        }
    }
}

/// Move leading `*`/`**` from a declarator name onto the type.
fn fold_pointer_prefix(ty: String, name: &str) -> (String, &str) {
    let stars = name.len() - name.trim_start_matches('*').len();
    if stars == 0 {
        return (ty, name);
    }
    (add_pointer(&ty, stars), name[stars..].trim_start())
}

/// Append `depth` pointer levels to a canonical type.
pub(crate) fn add_pointer(ty: &str, depth: usize) -> String {
    let stars = "*".repeat(depth);
    if ty.ends_with('*') {
        format!("{}{}", ty, stars)
    } else {
        format!("{} {}", ty, stars)
    }
}

/// A `typedef struct` definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StructDef {
    /// Name after the `struct` keyword; may be empty.
    pub tag_name: String,
    /// Name after the closing brace.
    pub typedef_name: String,
    /// Members in declaration order. The order is the layout.
    pub members: Vec<Variable>,
    /// `#define`s found inside the body, hoisted into `Model::macros` by
    /// the scanner.
    #[serde(skip)]
    pub nested_macros: Vec<Macro>,
}

impl StructDef {
    /// `struct tag`, or bare `struct` for an anonymous body.
    pub fn first_line(&self) -> String {
        if self.tag_name.is_empty() {
            "struct".to_string()
        } else {
            format!("struct {}", self.tag_name)
        }
    }

    pub fn to_typedef(&self) -> String {
        let mut out = format!("typedef {} {{\n", self.first_line());
        for member in &self.members {
            out.push_str(&format!("    {};\n", member.declaration()));
        }
        out.push_str(&format!("}} {};\n", self.typedef_name));
        out
    }

    /// The `<name>p` alias the loader keeps for source compatibility.
    pub fn pointer_alias(&self) -> String {
        format!("typedef {0} *{0}p;  // deprecated", self.typedef_name)
    }
}

/// How the generated loader treats a missing function.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    /// Loading fails when the symbol is absent.
    #[default]
    Required,
    /// The pointer may be null at runtime.
    Optional,
    /// Never loaded.
    Removed,
}

impl Classification {
    /// Wrapper macro used in the function mapping list.
    pub fn wrapper(self) -> &'static str {
        match self {
            Classification::Required => "LIBPNG_MAP",
            Classification::Optional => "LIBPNG_OPT",
            Classification::Removed => "REMOVE_API",
        }
    }
}

/// A callback typedef or an exported function.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FunctionDef {
    pub return_type: String,
    pub name: String,
    pub params: Vec<Variable>,
    pub classification: Classification,
}

impl FunctionDef {
    fn param_types(&self) -> String {
        self.params
            .iter()
            .map(|p| p.ty.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `ret name(t0, t1);`
    pub fn signature(&self) -> String {
        format!("{} {}({});", self.return_type, self.name, self.param_types())
    }

    /// `typedef ret (*PFN_name)(t0, t1);`
    pub fn pointer_typedef(&self) -> String {
        format!(
            "typedef {} (*PFN_{})({});",
            self.return_type,
            self.name,
            self.param_types()
        )
    }

    /// `typedef ret (*name)(t0, t1);`
    pub fn callback_typedef(&self) -> String {
        format!(
            "typedef {} (*{})({});",
            self.return_type,
            self.name,
            self.param_types()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(ty: &str, name: &str) -> Variable {
        Variable {
            ty: ty.to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn member_folds_pointer_prefix() {
        assert_eq!(Variable::member("png_byte", "*data"), var("png_byte *", "data"));
        assert_eq!(Variable::member("png_byte", "**rows"), var("png_byte **", "rows"));
    }

    #[test]
    fn member_keeps_array_suffix() {
        assert_eq!(Variable::member("png_byte", "name[5]"), var("png_byte", "name[5]"));
    }

    #[test]
    fn param_decays_array() {
        assert_eq!(Variable::param("png_byte", "buf[]"), var("png_byte *", "buf"));
        assert_eq!(Variable::param("png_bytep", "rows[]"), var("png_byte **", "rows"));
    }

    #[test]
    fn param_unnamed() {
        assert_eq!(Variable::param("png_structp", ""), var("png_struct *", ""));
        assert_eq!(var("png_struct *", "").declaration(), "png_struct *");
    }

    #[test]
    fn struct_typedef_text() {
        let def = StructDef {
            tag_name: "png_color_struct".to_string(),
            typedef_name: "png_color".to_string(),
            members: vec![var("png_byte", "red"), var("png_byte", "green")],
            nested_macros: Vec::new(),
        };
        assert_eq!(
            def.to_typedef(),
            "typedef struct png_color_struct {\n    png_byte red;\n    png_byte green;\n} png_color;\n"
        );
        assert_eq!(def.pointer_alias(), "typedef png_color *png_colorp;  // deprecated");
    }

    #[test]
    fn anonymous_struct_first_line() {
        let def = StructDef::default();
        assert_eq!(def.first_line(), "struct");
    }

    #[test]
    fn function_projections() {
        let func = FunctionDef {
            return_type: "void".to_string(),
            name: "png_set_sig_bytes".to_string(),
            params: vec![var("png_struct *", "png_ptr"), var("int", "num_bytes")],
            classification: Classification::Required,
        };
        assert_eq!(func.signature(), "void png_set_sig_bytes(png_struct *, int);");
        assert_eq!(
            func.pointer_typedef(),
            "typedef void (*PFN_png_set_sig_bytes)(png_struct *, int);"
        );
        assert_eq!(
            func.callback_typedef(),
            "typedef void (*png_set_sig_bytes)(png_struct *, int);"
        );
    }

    #[test]
    fn macro_render_indents_body() {
        let m = Macro {
            header_line: "#define FOO(a) \\".to_string(),
            body_lines: vec!["bar(a) \\".to_string(), "baz".to_string()],
        };
        assert!(m.is_multiline());
        assert_eq!(m.render(), "#define FOO(a) \\\n    bar(a) \\\n    baz");
    }

    #[test]
    fn classification_wrappers() {
        assert_eq!(Classification::default(), Classification::Required);
        assert_eq!(Classification::Optional.wrapper(), "LIBPNG_OPT");
        assert_eq!(Classification::Removed.wrapper(), "REMOVE_API");
    }
}
