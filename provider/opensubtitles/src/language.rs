//! 语言代码转换
//!
//! 站点的搜索参数和结果元数据都使用三位代码（部分为 ISO 639-2/B，如 `fre`、`ger`）。

/// 默认语言
pub const DEFAULT_CATALOG_CODE: &str = "eng";

const CODE_TABLE: &[(&str, &str)] = &[
    ("en", "eng"),
    ("es", "spa"),
    ("fr", "fre"),
    ("de", "ger"),
    ("it", "ita"),
    ("pt", "por"),
    ("ru", "rus"),
    ("ja", "jpn"),
    ("ko", "kor"),
    ("zh", "chi"),
    ("ar", "ara"),
    ("hi", "hin"),
    ("nl", "dut"),
    ("sv", "swe"),
    ("no", "nor"),
    ("da", "dan"),
    ("fi", "fin"),
    ("pl", "pol"),
    ("cs", "cze"),
    ("hu", "hun"),
    ("tr", "tur"),
];

const DISPLAY_NAMES: &[(&str, &str)] = &[
    ("english", "eng"),
    ("spanish", "spa"),
    ("french", "fre"),
    ("german", "ger"),
    ("italian", "ita"),
    ("portuguese", "por"),
    ("portuguese (br)", "pob"),
    ("russian", "rus"),
    ("japanese", "jpn"),
    ("korean", "kor"),
    ("chinese", "chi"),
    ("chinese (simplified)", "chi"),
    ("chinese (traditional)", "zht"),
    ("arabic", "ara"),
    ("hindi", "hin"),
    ("dutch", "dut"),
    ("swedish", "swe"),
    ("norwegian", "nor"),
    ("danish", "dan"),
    ("finnish", "fin"),
    ("polish", "pol"),
    ("czech", "cze"),
    ("hungarian", "hun"),
    ("turkish", "tur"),
];

/// 将语言代码转换为站点使用的三位代码
///
/// 三位代码原样（小写）返回，不做校验；无法识别时退回 `eng`，
/// 搜索不会因为语言而失败。
pub fn to_catalog_code(code: &str) -> String {
    let code = code.trim().to_lowercase();

    if let Some((_, mapped)) = CODE_TABLE.iter().find(|(short, _)| *short == code) {
        return mapped.to_string();
    }

    if code.chars().count() == 3 {
        return code;
    }

    DEFAULT_CATALOG_CODE.to_string()
}

/// 将页面上的语言名称（如 `French`）转换为三位代码，无法识别时返回 `None`
pub fn from_display_name(name: &str) -> Option<&'static str> {
    let name = name.trim().to_lowercase();
    DISPLAY_NAMES
        .iter()
        .find(|(display, _)| *display == name)
        .map(|(_, code)| *code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_catalog_code() {
        assert_eq!(to_catalog_code("en"), "eng");
        assert_eq!(to_catalog_code("FR"), "fre");
        assert_eq!(to_catalog_code("de"), "ger");
        assert_eq!(to_catalog_code("zh"), "chi");
        // 三位代码原样返回
        assert_eq!(to_catalog_code("SPA"), "spa");
        assert_eq!(to_catalog_code("pob"), "pob");
        // 无法识别时退回英语
        assert_eq!(to_catalog_code(""), "eng");
        assert_eq!(to_catalog_code("xx"), "eng");
        assert_eq!(to_catalog_code("english"), "eng");
    }

    #[test]
    fn test_to_catalog_code_total_and_idempotent() {
        let inputs = [
            "", " ", "en", "EN", "eng", "pt-BR", "a", "abcd", "日本語", "ñ", "x1", "fre", "  it ",
        ];
        for input in inputs {
            let code = to_catalog_code(input);
            assert_eq!(code.chars().count(), 3, "input {:?} -> {:?}", input, code);
            assert_eq!(code, code.to_lowercase());
            assert_eq!(to_catalog_code(&code), code, "not idempotent for {:?}", input);
        }
    }

    #[test]
    fn test_from_display_name() {
        assert_eq!(from_display_name("French"), Some("fre"));
        assert_eq!(from_display_name(" english "), Some("eng"));
        assert_eq!(from_display_name("Portuguese (BR)"), Some("pob"));
        assert_eq!(from_display_name("Klingon"), None);
        assert_eq!(from_display_name(""), None);
    }
}
