//! Header and content heuristics layered on top of name similarity.

use std::sync::LazyLock;

use regex::Regex;
use roster_model::{TargetTableSpec, normalize_label};

pub(crate) const QUALIFIED: u8 = 95;
pub(crate) const QUALIFIED_MINOR: u8 = 90;
pub(crate) const DEFAULTED: u8 = 70;
pub(crate) const DEFAULTED_SECONDARY: u8 = 65;
pub(crate) const DATE_CONTENT: u8 = 80;

static DATE_LIKE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4}-\d{2}-\d{2}|\d{2}/\d{2}/\d{4}|\d{2}-\d{2}-\d{4})$")
        .expect("Invalid date-like regex")
});

const NAME_WORDS: &[&str] = &[
    "name",
    "surname",
    "firstname",
    "lastname",
    "forename",
    "givenname",
    "middlename",
    "nickname",
    "familyname",
    "fullname",
];
const UNQUALIFIED_NAME_WORDS: &[&str] = &["name", "full", "fullname", "display"];
const PHONE_WORDS: &[&str] = &["phone", "telephone", "tel", "mobile", "cell", "cellphone", "mob"];
const ADDRESS_WORDS: &[&str] = &["address", "addr", "street"];

/// A score a header suggests for a named field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Hint {
    pub field: String,
    pub score: u8,
}

/// Split a header into lowercase words at separators, camelCase humps and
/// letter/digit boundaries ("AddressLine1" -> address, line, 1).
pub(crate) fn tokenize(header: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut prev: Option<char> = None;
    for ch in header.chars() {
        if !ch.is_alphanumeric() {
            flush(&mut tokens, &mut current);
            prev = None;
            continue;
        }
        if let Some(p) = prev {
            let boundary = (p.is_lowercase() && ch.is_uppercase())
                || (p.is_alphabetic() && ch.is_numeric())
                || (p.is_numeric() && ch.is_alphabetic());
            if boundary {
                flush(&mut tokens, &mut current);
            }
        }
        current.extend(ch.to_lowercase());
        prev = Some(ch);
    }
    flush(&mut tokens, &mut current);
    tokens
}

fn flush(tokens: &mut Vec<String>, current: &mut String) {
    if !current.is_empty() {
        tokens.push(std::mem::take(current));
    }
}

/// True when every sampled value looks like a supported date layout.
pub(crate) fn looks_like_dates(samples: &[&str]) -> bool {
    !samples.is_empty() && samples.iter().all(|value| DATE_LIKE.is_match(value.trim()))
}

/// Field hints implied by a header's wording.
///
/// Only fields present in `table` are returned.
pub(crate) fn header_hints(table: &TargetTableSpec, header: &str) -> Vec<Hint> {
    let tokens = tokenize(header);
    let words = Words(&tokens);
    let mut hints = Vec::new();
    let mut push = |candidates: &[&str], score: u8| {
        if let Some(field) = candidates.iter().find(|name| table.has_field(name)) {
            hints.push(Hint {
                field: (*field).to_string(),
                score,
            });
        }
    };

    let is_email = normalize_label(header).contains("email");
    if is_email {
        if let Some(field) = table.email_field.as_deref() {
            push(&[field], QUALIFIED);
        }
        return hints;
    }

    let is_address = words.any(ADDRESS_WORDS);

    if !is_address && words.any(PHONE_WORDS) {
        let mut qualified = false;
        if words.any(&["mobile", "cell", "cellphone", "mob"]) {
            push(&["mobile_phone"], QUALIFIED);
            qualified = true;
        }
        if words.has("home") {
            push(&["home_phone"], QUALIFIED);
            qualified = true;
        }
        if words.any(&["work", "business", "office"]) {
            push(&["work_phone"], QUALIFIED);
            qualified = true;
        }
        if !qualified {
            push(&["mobile_phone"], DEFAULTED);
            push(&["phone"], DEFAULTED);
            push(&["home_phone"], DEFAULTED_SECONDARY);
            push(&["work_phone"], DEFAULTED_SECONDARY);
        }
    }

    if words.any(NAME_WORDS) {
        let mut qualified = false;
        if words.any(&["first", "given", "forename", "firstname", "givenname"]) {
            push(&["first_name", "given_name"], QUALIFIED);
            qualified = true;
        }
        if words.any(&["last", "surname", "family", "lastname", "familyname"]) {
            push(&["surname", "last_name", "family_name"], QUALIFIED);
            qualified = true;
        }
        if words.any(&["middle", "middlename"]) {
            push(&["middle_name"], QUALIFIED_MINOR);
            qualified = true;
        }
        if words.any(&["nick", "nickname", "preferred", "known"]) {
            push(&["nickname", "preferred_name"], QUALIFIED_MINOR);
            qualified = true;
        }
        if !qualified
            && words.all_in(UNQUALIFIED_NAME_WORDS)
            && let Some(field) = table.primary_name_field.as_deref()
        {
            push(&[field], DEFAULTED);
        }
    }

    let mut address_qualified = false;
    if words.any(&["suburb", "city", "town", "locality"]) {
        push(&["suburb"], QUALIFIED);
        address_qualified = true;
    }
    if words.any(&["postcode", "zip", "zipcode"])
        || (words.any(&["post", "postal"]) && words.has("code"))
    {
        push(&["postcode"], QUALIFIED);
        address_qualified = true;
    }
    if words.has("state") {
        push(&["state"], QUALIFIED);
        address_qualified = true;
    }
    if is_address || words.any(&["line", "line1", "line2"]) {
        if words.any(&["line1", "street"]) || (words.any(&["line", "address"]) && words.has("1")) {
            push(&["address_line_1"], QUALIFIED);
            address_qualified = true;
        }
        if words.has("line2") || (words.any(&["line", "address"]) && words.has("2")) {
            push(&["address_line_2"], QUALIFIED);
            address_qualified = true;
        }
        if is_address && !address_qualified {
            push(&["address_line_1"], DEFAULTED);
        }
    }

    hints
}

struct Words<'a>(&'a [String]);

impl Words<'_> {
    fn has(&self, word: &str) -> bool {
        self.0.iter().any(|t| t == word)
    }

    fn any(&self, words: &[&str]) -> bool {
        words.iter().any(|w| self.has(w))
    }

    fn all_in(&self, words: &[&str]) -> bool {
        self.0.iter().all(|t| words.contains(&t.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use roster_model::{FieldType, TargetFieldSpec};

    use super::*;

    fn table(fields: &[&str]) -> TargetTableSpec {
        TargetTableSpec {
            name: "workers".to_string(),
            label: String::new(),
            primary_name_field: Some("first_name".to_string()),
            email_field: Some("email".to_string()),
            identifier_field: None,
            natural_key: Vec::new(),
            fields: fields
                .iter()
                .map(|name| TargetFieldSpec {
                    name: (*name).to_string(),
                    field_type: FieldType::Text,
                    required: false,
                    description: String::new(),
                    enum_options: None,
                })
                .collect(),
        }
    }

    fn hinted(table: &TargetTableSpec, header: &str) -> Vec<(String, u8)> {
        header_hints(table, header)
            .into_iter()
            .map(|h| (h.field, h.score))
            .collect()
    }

    fn all_fields() -> TargetTableSpec {
        table(&[
            "first_name",
            "surname",
            "middle_name",
            "nickname",
            "email",
            "mobile_phone",
            "home_phone",
            "work_phone",
            "address_line_1",
            "address_line_2",
            "suburb",
            "state",
            "postcode",
        ])
    }

    #[test]
    fn tokenizes_humps_and_digits() {
        assert_eq!(tokenize("AddressLine1"), vec!["address", "line", "1"]);
        assert_eq!(tokenize("address_line_2"), vec!["address", "line", "2"]);
        assert_eq!(tokenize(" Post Code "), vec!["post", "code"]);
        assert_eq!(tokenize("DOB"), vec!["dob"]);
    }

    #[test]
    fn qualified_phone_headers() {
        let t = all_fields();
        assert_eq!(hinted(&t, "Mobile"), vec![("mobile_phone".to_string(), 95)]);
        assert_eq!(hinted(&t, "Home Phone"), vec![("home_phone".to_string(), 95)]);
        assert_eq!(hinted(&t, "Work Tel"), vec![("work_phone".to_string(), 95)]);
    }

    #[test]
    fn bare_phone_prefers_mobile() {
        let t = all_fields();
        assert_eq!(
            hinted(&t, "Phone"),
            vec![
                ("mobile_phone".to_string(), 70),
                ("home_phone".to_string(), 65),
                ("work_phone".to_string(), 65),
            ]
        );
    }

    #[test]
    fn name_qualifiers() {
        let t = all_fields();
        assert_eq!(hinted(&t, "Last Name"), vec![("surname".to_string(), 95)]);
        assert_eq!(hinted(&t, "Given Name"), vec![("first_name".to_string(), 95)]);
        assert_eq!(hinted(&t, "Middle Name"), vec![("middle_name".to_string(), 90)]);
        assert_eq!(hinted(&t, "Preferred Name"), vec![("nickname".to_string(), 90)]);
        assert_eq!(hinted(&t, "Full Name"), vec![("first_name".to_string(), 70)]);
        assert!(hinted(&t, "Company Name").is_empty());
    }

    #[test]
    fn email_wins_over_everything() {
        let t = all_fields();
        assert_eq!(hinted(&t, "Email Address"), vec![("email".to_string(), 95)]);
        assert_eq!(hinted(&t, "E-mail"), vec![("email".to_string(), 95)]);
    }

    #[test]
    fn address_qualifiers() {
        let t = all_fields();
        assert_eq!(hinted(&t, "Address Line 1"), vec![("address_line_1".to_string(), 95)]);
        assert_eq!(hinted(&t, "AddressLine2"), vec![("address_line_2".to_string(), 95)]);
        assert_eq!(hinted(&t, "Home Address"), vec![("address_line_1".to_string(), 70)]);
        assert_eq!(hinted(&t, "City"), vec![("suburb".to_string(), 95)]);
        assert_eq!(hinted(&t, "Post Code"), vec![("postcode".to_string(), 95)]);
        assert_eq!(hinted(&t, "Postal Address"), vec![("address_line_1".to_string(), 70)]);
    }

    #[test]
    fn missing_fields_produce_no_hint() {
        let t = table(&["name", "phone"]);
        assert_eq!(hinted(&t, "Telephone"), vec![("phone".to_string(), 70)]);
        assert!(hinted(&t, "Mobile").is_empty());
    }

    #[test]
    fn date_samples() {
        assert!(looks_like_dates(&["2024-01-31", "31/01/2024", "31-01-2024"]));
        assert!(!looks_like_dates(&["2024-01-31", "soon"]));
        assert!(!looks_like_dates(&[]));
    }
}
