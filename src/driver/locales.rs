//! Locale tables matched against the first URI segment by locale-aware drivers.

/// Language and language_REGION codes Craft sites may use as localized web roots.
pub const CRAFT_LOCALES: &[&str] = &[
    "ar", "ar_sa", "bg", "bn", "ca", "cs", "cy", "da", "de", "de_at", "de_ch", "el", "en", "en_au",
    "en_ca", "en_gb", "en_ie", "en_in", "en_nz", "en_us", "eo", "es", "es_ar", "es_cl", "es_co",
    "es_cr", "es_do", "es_ec", "es_es", "es_gt", "es_mx", "es_pe", "es_pr", "es_py", "es_us",
    "es_uy", "es_ve", "et", "eu", "fa", "fi", "fil", "fo", "fr", "fr_be", "fr_ca", "fr_ch", "ga",
    "gl", "gu", "he", "hi", "hr", "hu", "hy", "id", "is", "it", "it_ch", "ja", "ka", "kk", "km",
    "kn", "ko", "ky", "lt", "lv", "mk", "ml", "mn", "mr", "ms", "mt", "nb", "nl", "nl_be", "nn",
    "no", "pa", "pl", "ps", "pt", "pt_br", "pt_pt", "ro", "ru", "si", "sk", "sl", "sq", "sr", "sv",
    "sw", "ta", "te", "th", "tk", "tr", "uk", "ur", "uz", "vi", "zh", "zh_cn", "zh_hk", "zh_tw",
];

/// Two-letter codes Statamic v2 sites use for localized subfolders.
pub const STATAMIC_LOCALES: &[&str] = &[
    "af", "ax", "al", "dz", "as", "ad", "ao", "ai", "aq", "ag", "ar", "am", "aw", "au", "at", "az",
    "bs", "bh", "bd", "bb", "by", "be", "bz", "bj", "bm", "bt", "bo", "bq", "ba", "bw", "bv", "br",
    "io", "bn", "bg", "bf", "bi", "cv", "kh", "cm", "ca", "ky", "cf", "td", "cl", "cn", "cx", "cc",
    "co", "km", "cg", "cd", "ck", "cr", "ci", "hr", "cu", "cw", "cy", "cz", "dk", "dj", "dm", "do",
    "ec", "eg", "sv", "gq", "er", "ee", "et", "fk", "fo", "fj", "fi", "fr", "gf", "pf", "tf", "ga",
    "gm", "ge", "de", "gh", "gi", "gr", "gl", "gd", "gp", "gu", "gt", "gg", "gn", "gw", "gy", "ht",
    "hm", "va", "hn", "hk", "hu", "is", "in", "id", "ir", "iq", "ie", "im", "il", "it", "jm", "jp",
    "je", "jo", "kz", "ke", "ki", "kp", "kr", "kw", "kg", "la", "lv", "lb", "ls", "lr", "ly", "li",
    "lt", "lu", "mo", "mk", "mg", "mw", "my", "mv", "ml", "mt", "mh", "mq", "mr", "mu", "yt", "mx",
    "fm", "md", "mc", "mn", "me", "ms", "ma", "mz", "mm", "na", "nr", "np", "nl", "nc", "nz", "ni",
    "ne", "ng", "nu", "nf", "mp", "no", "om", "pk", "pw", "ps", "pa", "pg", "py", "pe", "ph", "pn",
    "pl", "pt", "pr", "qa", "re", "ro", "ru", "rw", "bl", "sh", "kn", "lc", "mf", "pm", "vc", "ws",
    "sm", "st", "sa", "sn", "rs", "sc", "sl", "sg", "sx", "sk", "si", "sb", "so", "za", "gs", "ss",
    "es", "lk", "sd", "sr", "sj", "sz", "se", "ch", "sy", "tw", "tj", "tz", "th", "tl", "tg", "tk",
    "to", "tt", "tn", "tr", "tm", "tc", "tv", "ug", "ua", "ae", "gb", "us", "um", "uy", "uz", "vu",
    "ve", "vn", "vg", "vi", "wf", "eh", "ye", "zm", "zw", "en", "zh",
];

/// The first path segment of `uri` if it appears in `locales`.
pub fn uri_locale<'a>(uri: &'a str, locales: &[&str]) -> Option<&'a str> {
    let segment = uri.strip_prefix('/')?.split('/').next()?;
    locales.contains(&segment).then_some(segment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uri_locale() {
        assert_eq!(uri_locale("/de/about", CRAFT_LOCALES), Some("de"));
        assert_eq!(uri_locale("/en_gb", CRAFT_LOCALES), Some("en_gb"));
        assert_eq!(uri_locale("/blog/de", CRAFT_LOCALES), None);
        assert_eq!(uri_locale("/", CRAFT_LOCALES), None);
        assert_eq!(uri_locale("", CRAFT_LOCALES), None);
    }

    #[test]
    fn test_statamic_table_has_common_codes() {
        assert!(STATAMIC_LOCALES.contains(&"fr"));
        assert!(STATAMIC_LOCALES.contains(&"en"));
        assert!(!STATAMIC_LOCALES.contains(&"blog"));
    }
}
