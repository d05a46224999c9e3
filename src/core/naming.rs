//! core::naming
//!
//! Identifier casing for storage locations.
//!
//! Module and storage item names are declared in upper camel case
//! (`System`, `XcmPallet`, `ValidatorCount`) and appear in locations in
//! lower camel case (`system`, `xcmPallet`, `validatorCount`).

/// Convert an identifier to lower camel case.
///
/// - A leading uppercase run is lowered as a block, keeping the last
///   capital if a lowercase letter follows (`XCMPallet` -> `xcmPallet`)
/// - Snake case is joined (`total_issuance` -> `totalIssuance`)
///
/// # Example
///
/// ```
/// use metaconform::core::naming::lower_camel;
///
/// assert_eq!(lower_camel("System"), "system");
/// assert_eq!(lower_camel("XCMPallet"), "xcmPallet");
/// assert_eq!(lower_camel("total_issuance"), "totalIssuance");
/// ```
pub fn lower_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for (i, part) in name.split('_').filter(|p| !p.is_empty()).enumerate() {
        if i == 0 {
            out.push_str(&lower_leading_run(part));
            continue;
        }
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.extend(chars);
        }
    }
    out
}

fn lower_leading_run(word: &str) -> String {
    let chars: Vec<char> = word.chars().collect();
    let run = chars.iter().take_while(|c| c.is_uppercase()).count();
    // Keep the capital that starts the next word: `XCMPallet` lowers `XCM` only.
    let lowered = if run > 1 && run < chars.len() && chars[run].is_lowercase() {
        run - 1
    } else {
        run.max(1).min(chars.len())
    };

    chars
        .iter()
        .enumerate()
        .flat_map(|(i, c)| {
            if i < lowered {
                c.to_lowercase().collect::<Vec<_>>()
            } else {
                vec![*c]
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_word() {
        assert_eq!(lower_camel("System"), "system");
        assert_eq!(lower_camel("system"), "system");
        assert_eq!(lower_camel("A"), "a");
    }

    #[test]
    fn camel_words() {
        assert_eq!(lower_camel("ValidatorCount"), "validatorCount");
        assert_eq!(lower_camel("ElectionsPhragmen"), "electionsPhragmen");
    }

    #[test]
    fn acronyms() {
        assert_eq!(lower_camel("XCMPallet"), "xcmPallet");
        assert_eq!(lower_camel("XcmPallet"), "xcmPallet");
        assert_eq!(lower_camel("DMP"), "dmp");
        assert_eq!(lower_camel("UMPQueue"), "umpQueue");
    }

    #[test]
    fn snake_case() {
        assert_eq!(lower_camel("total_issuance"), "totalIssuance");
        assert_eq!(lower_camel("Account_nonce"), "accountNonce");
        assert_eq!(lower_camel("__leading"), "leading");
    }

    #[test]
    fn empty() {
        assert_eq!(lower_camel(""), "");
    }
}
