//! Named character entities.
//!
//! Source text may reference HTML named entities such as `&nbsp;` or
//! `&alpha;`. XML only predefines five of them, so every other name used by a
//! book must be declared in the DocBook document type. [`EntityRegistry`]
//! records which names a run actually used and which ones are unknown.

use std::collections::{BTreeMap, BTreeSet};

/// Entities every XML processor understands without a declaration.
const PREDEFINED: [&str; 5] = ["amp", "lt", "gt", "quot", "apos"];

/// Look up the code point of a named entity.
///
/// Returns `None` for names outside the supported HTML 4 set and for the
/// XML-predefined entities, which never need a declaration.
#[must_use]
pub fn code_point(name: &str) -> Option<u32> {
    let code = match name {
        "caret" => 8257,
        "check" => 10003,
        "cir" => 9675,
        "fnof" => 402,
        "Alpha" => 913,
        "Beta" => 914,
        "Gamma" => 915,
        "Delta" => 916,
        "Epsilon" => 917,
        "Zeta" => 918,
        "Eta" => 919,
        "Theta" => 920,
        "Iota" => 921,
        "Kappa" => 922,
        "Lambda" => 923,
        "Mu" => 924,
        "Nu" => 925,
        "Xi" => 926,
        "Omicron" => 927,
        "Pi" => 928,
        "Rho" => 929,
        "Sigma" => 931,
        "Tau" => 932,
        "Upsilon" => 933,
        "Phi" => 934,
        "Chi" => 935,
        "Psi" => 936,
        "Omega" => 937,
        "alpha" => 945,
        "beta" => 946,
        "gamma" => 947,
        "delta" => 948,
        "epsilon" => 949,
        "zeta" => 950,
        "eta" => 951,
        "theta" => 952,
        "iota" => 953,
        "kappa" => 954,
        "lambda" => 955,
        "mu" => 956,
        "nu" => 957,
        "xi" => 958,
        "omicron" => 959,
        "pi" => 960,
        "rho" => 961,
        "sigmaf" => 962,
        "sigma" => 963,
        "tau" => 964,
        "upsilon" => 965,
        "phi" => 966,
        "chi" => 967,
        "psi" => 968,
        "omega" => 969,
        "thetasym" => 977,
        "upsih" => 978,
        "piv" => 982,
        "bull" => 8226,
        "hellip" => 8230,
        "prime" => 8242,
        "Prime" => 8243,
        "oline" => 8254,
        "frasl" => 8260,
        "weierp" => 8472,
        "image" => 8465,
        "real" => 8476,
        "trade" => 8482,
        "alefsym" => 8501,
        "larr" => 8592,
        "uarr" => 8593,
        "rarr" => 8594,
        "darr" => 8595,
        "harr" => 8596,
        "crarr" => 8629,
        "lArr" => 8656,
        "uArr" => 8657,
        "rArr" => 8658,
        "dArr" => 8659,
        "hArr" => 8660,
        "forall" => 8704,
        "part" => 8706,
        "exist" => 8707,
        "empty" => 8709,
        "nabla" => 8711,
        "isin" => 8712,
        "notin" => 8713,
        "ni" => 8715,
        "prod" => 8719,
        "sum" => 8721,
        "minus" => 8722,
        "lowast" => 8727,
        "radic" => 8730,
        "prop" => 8733,
        "infin" => 8734,
        "ang" => 8736,
        "and" => 8743,
        "or" => 8744,
        "cap" => 8745,
        "cup" => 8746,
        "int" => 8747,
        "there4" => 8756,
        "sim" => 8764,
        "cong" => 8773,
        "asymp" => 8776,
        "ne" => 8800,
        "equiv" => 8801,
        "le" => 8804,
        "ge" => 8805,
        "sub" => 8834,
        "sup" => 8835,
        "nsub" => 8836,
        "sube" => 8838,
        "supe" => 8839,
        "oplus" => 8853,
        "otimes" => 8855,
        "perp" => 8869,
        "sdot" => 8901,
        "lceil" => 8968,
        "rceil" => 8969,
        "lfloor" => 8970,
        "rfloor" => 8971,
        "lang" => 9001,
        "rang" => 9002,
        "loz" => 9674,
        "spades" => 9824,
        "clubs" => 9827,
        "hearts" => 9829,
        "diams" => 9830,
        "quot" => 34,
        "amp" => 38,
        "lt" => 60,
        "gt" => 62,
        "OElig" => 338,
        "oelig" => 339,
        "Scaron" => 352,
        "scaron" => 353,
        "Yuml" => 376,
        "circ" => 710,
        "tilde" => 732,
        "ensp" => 8194,
        "emsp" => 8195,
        "thinsp" => 8201,
        "zwnj" => 8204,
        "zwj" => 8205,
        "lrm" => 8206,
        "rlm" => 8207,
        "ndash" => 8211,
        "mdash" => 8212,
        "lsquo" => 8216,
        "rsquo" => 8217,
        "sbquo" => 8218,
        "ldquo" => 8220,
        "rdquo" => 8221,
        "bdquo" => 8222,
        "dagger" => 8224,
        "Dagger" => 8225,
        "permil" => 8240,
        "lsaquo" => 8249,
        "rsaquo" => 8250,
        "euro" => 8364,
        "nbsp" => 160,
        "iexcl" => 161,
        "cent" => 162,
        "pound" => 163,
        "curren" => 164,
        "yen" => 165,
        "brvbar" => 166,
        "sect" => 167,
        "uml" => 168,
        "copy" => 169,
        "ordf" => 170,
        "laquo" => 171,
        "not" => 172,
        "shy" => 173,
        "reg" => 174,
        "macr" => 175,
        "deg" => 176,
        "plusmn" => 177,
        "sup2" => 178,
        "sup3" => 179,
        "acute" => 180,
        "micro" => 181,
        "para" => 182,
        "middot" => 183,
        "cedil" => 184,
        "sup1" => 185,
        "ordm" => 186,
        "raquo" => 187,
        "frac14" => 188,
        "frac12" => 189,
        "frac34" => 190,
        "iquest" => 191,
        "Agrave" => 192,
        "Aacute" => 193,
        "Acirc" => 194,
        "Atilde" => 195,
        "Auml" => 196,
        "Aring" => 197,
        "AElig" => 198,
        "Ccedil" => 199,
        "Egrave" => 200,
        "Eacute" => 201,
        "Ecirc" => 202,
        "Euml" => 203,
        "Igrave" => 204,
        "Iacute" => 205,
        "Icirc" => 206,
        "Iuml" => 207,
        "ETH" => 208,
        "Ntilde" => 209,
        "Ograve" => 210,
        "Oacute" => 211,
        "Ocirc" => 212,
        "Otilde" => 213,
        "Ouml" => 214,
        "times" => 215,
        "Oslash" => 216,
        "Ugrave" => 217,
        "Uacute" => 218,
        "Ucirc" => 219,
        "Uuml" => 220,
        "Yacute" => 221,
        "THORN" => 222,
        "szlig" => 223,
        "agrave" => 224,
        "aacute" => 225,
        "acirc" => 226,
        "atilde" => 227,
        "auml" => 228,
        "aring" => 229,
        "aelig" => 230,
        "ccedil" => 231,
        "egrave" => 232,
        "eacute" => 233,
        "ecirc" => 234,
        "euml" => 235,
        "igrave" => 236,
        "iacute" => 237,
        "icirc" => 238,
        "iuml" => 239,
        "eth" => 240,
        "ntilde" => 241,
        "ograve" => 242,
        "oacute" => 243,
        "ocirc" => 244,
        "otilde" => 245,
        "ouml" => 246,
        "divide" => 247,
        "oslash" => 248,
        "ugrave" => 249,
        "uacute" => 250,
        "ucirc" => 251,
        "uuml" => 252,
        "yacute" => 253,
        "thorn" => 254,
        "yuml" => 255,
        _ => return None,
    };
    Some(code)
}

/// Tracks entity usage over a whole run.
#[derive(Debug, Default, Clone)]
pub struct EntityRegistry {
    used: BTreeMap<String, u32>,
    unsupported: BTreeSet<String>,
}

impl EntityRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a reference to `name`.
    ///
    /// Returns `true` when the entity is usable in the output, either because
    /// it is XML-predefined or because it has a known code point.
    pub fn register(&mut self, name: &str) -> bool {
        if PREDEFINED.contains(&name) {
            return true;
        }
        if let Some(code) = code_point(name) {
            self.used.insert(name.to_owned(), code);
            true
        } else {
            self.unsupported.insert(name.to_owned());
            false
        }
    }

    /// Entities that need a declaration, keyed by name.
    #[must_use]
    pub fn used(&self) -> &BTreeMap<String, u32> {
        &self.used
    }

    /// Unknown entity names, sorted and deduplicated.
    #[must_use]
    pub fn unsupported(&self) -> Vec<String> {
        self.unsupported.iter().cloned().collect()
    }

    /// Render the internal subset of a `DOCTYPE` declaring every used entity.
    ///
    /// Returns `None` when nothing needs declaring.
    #[must_use]
    pub fn declarations(&self) -> Option<String> {
        if self.used.is_empty() {
            return None;
        }
        let mut out = String::new();
        for (name, code) in &self.used {
            out.push_str(&format!("<!ENTITY {name} \"&#{code};\">\n"));
        }
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_point_known() {
        assert_eq!(code_point("nbsp"), Some(160));
        assert_eq!(code_point("alpha"), Some(945));
        assert_eq!(code_point("check"), Some(0x2713));
    }

    #[test]
    fn test_code_point_case_sensitive_pairs() {
        assert_eq!(code_point("ETH"), Some(208));
        assert_eq!(code_point("eth"), Some(240));
        assert_eq!(code_point("THORN"), Some(222));
        assert_eq!(code_point("thorn"), Some(254));
    }

    #[test]
    fn test_code_point_format_characters() {
        assert_eq!(code_point("zwnj"), Some(8204));
        assert_eq!(code_point("zwj"), Some(8205));
        assert_eq!(code_point("lrm"), Some(8206));
        assert_eq!(code_point("rlm"), Some(8207));
        assert_eq!(code_point("shy"), Some(173));
        assert_eq!(code_point("iexcl"), Some(161));
    }

    #[test]
    fn test_code_point_unknown() {
        assert_eq!(code_point("foo"), None);
        assert_eq!(code_point("amp"), None);
    }

    #[test]
    fn test_register_known_records_usage() {
        let mut registry = EntityRegistry::new();

        assert!(registry.register("eacute"));
        assert!(registry.register("eacute"));

        assert_eq!(registry.used().len(), 1);
        assert_eq!(registry.used().get("eacute"), Some(&233));
        assert!(registry.unsupported().is_empty());
    }

    #[test]
    fn test_register_predefined_is_not_declared() {
        let mut registry = EntityRegistry::new();

        assert!(registry.register("amp"));
        assert!(registry.register("lt"));

        assert!(registry.used().is_empty());
        assert!(registry.declarations().is_none());
    }

    #[test]
    fn test_register_unknown_sorted_and_deduplicated() {
        let mut registry = EntityRegistry::new();

        assert!(!registry.register("zzz"));
        assert!(!registry.register("bogus"));
        assert!(!registry.register("zzz"));

        assert_eq!(registry.unsupported(), vec!["bogus", "zzz"]);
    }

    #[test]
    fn test_declarations() {
        let mut registry = EntityRegistry::new();
        registry.register("nbsp");
        registry.register("copy");

        assert_eq!(
            registry.declarations().as_deref(),
            Some("<!ENTITY copy \"&#169;\">\n<!ENTITY nbsp \"&#160;\">\n")
        );
    }
}
