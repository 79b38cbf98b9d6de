//! Type normalization. Maps the header's typedef naming conventions onto
//! canonical C spellings (`png_const_bytep` → `const png_byte *`).

/// Pointer-typedef suffixes, most specific first. The first match wins:
/// `(suffix, bytes to drop, replacement)`.
const POINTER_SUFFIXES: &[(&str, usize, &str)] = &[
    ("charp", 1, " *"),
    ("colorp", 1, " *"),
    ("point_p", 2, " *"),
    // restrict pointer, e.g. png_structrp
    ("rp", 2, " *"),
    ("pp", 2, " **"),
    ("p", 1, " *"),
];

const CONST_PREFIX: &str = "png_const_";
const RESTRICT: &str = "PNG_RESTRICT";

/// Normalize a raw type token. Idempotent: canonical input comes back
/// unchanged.
pub fn normalize_type(raw: &str) -> String {
    let mut tokens: Vec<&str> = raw.split_whitespace().collect();
    // Drop the qualifier first so the suffix below it is still resolved.
    if tokens.len() > 1 && tokens.last() == Some(&RESTRICT) {
        tokens.pop();
    }
    let mut ty = tokens.join(" ");

    ty = resolve_pointer_suffix(&ty);

    if let Some(rest) = ty.strip_prefix(CONST_PREFIX) {
        ty = format!("const png_{}", rest);
    }

    space_pointer_stars(&ty)
}

fn resolve_pointer_suffix(ty: &str) -> String {
    for &(suffix, drop, replacement) in POINTER_SUFFIXES {
        if ty.len() > suffix.len() && ty.ends_with(suffix) {
            return format!("{}{}", &ty[..ty.len() - drop], replacement);
        }
    }
    ty.to_string()
}

/// `jmp_buf*` → `jmp_buf *`, `png_byte * *` → `png_byte **`.
fn space_pointer_stars(ty: &str) -> String {
    let Some(pos) = ty.find('*') else {
        return ty.to_string();
    };
    let (base, tail) = ty.split_at(pos);
    if !tail.chars().all(|c| c == '*' || c.is_whitespace()) {
        return ty.to_string();
    }
    let stars = tail.chars().filter(|&c| c == '*').count();
    format!("{} {}", base.trim_end(), "*".repeat(stars))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_plain_pointer() {
        assert_eq!(normalize_type("png_voidp"), "png_void *");
        assert_eq!(normalize_type("png_uint_16p"), "png_uint_16 *");
    }

    #[test]
    fn resolves_restrict_pointer() {
        assert_eq!(normalize_type("png_structrp"), "png_struct *");
        assert_eq!(normalize_type("png_inforp"), "png_info *");
    }

    #[test]
    fn specific_suffixes_win_over_rp() {
        assert_eq!(normalize_type("png_charp"), "png_char *");
        assert_eq!(normalize_type("png_colorp"), "png_color *");
    }

    #[test]
    fn resolves_fixed_point_pointer() {
        assert_eq!(normalize_type("png_fixed_point_p"), "png_fixed_point *");
    }

    #[test]
    fn resolves_double_pointer() {
        assert_eq!(normalize_type("png_bytepp"), "png_byte **");
    }

    #[test]
    fn rewrites_const_prefix() {
        assert_eq!(normalize_type("png_const_charp"), "const png_char *");
        assert_eq!(normalize_type("png_const_structrp"), "const png_struct *");
        assert_eq!(normalize_type("png_const_uint_16p"), "const png_uint_16 *");
    }

    #[test]
    fn drops_restrict_qualifier() {
        assert_eq!(normalize_type("png_const_charp PNG_RESTRICT"), "const png_char *");
        assert_eq!(normalize_type("png_uint_32 PNG_RESTRICT"), "png_uint_32");
    }

    #[test]
    fn leaves_plain_types() {
        assert_eq!(normalize_type("int"), "int");
        assert_eq!(normalize_type("void"), "void");
        assert_eq!(normalize_type("png_uint_32"), "png_uint_32");
        assert_eq!(normalize_type("png_error_ptr"), "png_error_ptr");
        assert_eq!(normalize_type("size_t"), "size_t");
    }

    #[test]
    fn spaces_pointer_stars() {
        assert_eq!(normalize_type("jmp_buf*"), "jmp_buf *");
        assert_eq!(normalize_type("png_byte * *"), "png_byte **");
    }

    #[test]
    fn idempotent() {
        let samples = [
            "png_voidp",
            "png_structrp",
            "png_const_charp",
            "png_colorp",
            "png_const_colorp",
            "png_fixed_point_p",
            "png_bytepp",
            "png_const_bytep PNG_RESTRICT",
            "jmp_buf*",
            "double",
            "const png_byte *",
            "png_alloc_size_t",
            "png_byte * *",
        ];
        for raw in samples {
            let once = normalize_type(raw);
            assert_eq!(normalize_type(&once), once, "not idempotent for {raw}");
        }
    }
}
