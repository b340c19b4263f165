use std::collections::BTreeMap;
use std::sync::Arc;

use super::common::*;
use crate::forms::testing::TemplateBuilder;
use crate::forms::{
    read_back, AcroFormError, ApplicantRecord, FieldMapper, FormFillError, FormFillService,
    InMemoryTemplateStore, PayloadError, UnknownFieldPolicy, N400,
};

fn filled_values(body: &str) -> BTreeMap<String, String> {
    let document = n400_service()
        .handle("n-400", body.as_bytes())
        .expect("fill succeeds");
    read_back(&document.bytes).expect("filled document readable")
}

#[test]
fn empty_body_blanks_every_mapped_field() {
    let values = filled_values("");
    for target in N400.targets() {
        assert_eq!(values.get(target).map(String::as_str), Some(""), "{target}");
    }
    assert_eq!(values.get(UNMAPPED_FIELD).map(String::as_str), Some("SINGLE"));
}

#[test]
fn surname_and_alien_number_scenario() {
    let values = filled_values(r#"{"lastName":" smith ","alienNumber":"123456789"}"#);

    assert_eq!(values.get(SURNAME_FIELD).map(String::as_str), Some("SMITH"));
    let alien_fields: Vec<&String> = values
        .iter()
        .filter(|(name, _)| name.contains(ALIEN_NUMBER_FIELD))
        .map(|(_, value)| value)
        .collect();
    assert_eq!(alien_fields.len(), 14);
    assert!(alien_fields.iter().all(|value| value.as_str() == "123456789"));

    for target in N400.targets() {
        if target == SURNAME_FIELD || target.contains(ALIEN_NUMBER_FIELD) {
            continue;
        }
        assert_eq!(values.get(target).map(String::as_str), Some(""), "{target}");
    }
}

#[test]
fn document_values_match_the_field_map() {
    let body = r#"{"firstName":"ana","city":" austin ","email":"Ana@Example.com","ssn":"123-45-6789"}"#;
    let record = ApplicantRecord::from_body(body.as_bytes()).expect("valid body");
    let fields = FieldMapper::new(&N400).map(&record);

    let values = filled_values(body);
    for (name, value) in fields.iter() {
        assert_eq!(values.get(name).map(String::as_str), Some(value), "{name}");
    }
}

#[test]
fn response_metadata_names_the_form() {
    let document = n400_service()
        .handle("N-400", b"{}")
        .expect("fill succeeds");
    assert_eq!(document.filename, "N-400.pdf");
    assert_eq!(document.media_type, mime::APPLICATION_PDF);
    assert!(document.bytes.starts_with(b"%PDF-"));
}

#[test]
fn unknown_form_is_template_not_found() {
    let err = n400_service()
        .handle("i-130", b"{}")
        .expect_err("form is not in the catalog");
    assert!(matches!(err, FormFillError::TemplateNotFound { ref form_id } if form_id == "i-130"));
}

#[test]
fn catalog_form_without_template_is_template_not_found() {
    let service = service_with(InMemoryTemplateStore::new(), UnknownFieldPolicy::Ignore);
    let err = service
        .handle("n-400", b"")
        .expect_err("no template registered");
    assert!(matches!(err, FormFillError::TemplateNotFound { ref form_id } if form_id == "N-400"));
}

#[test]
fn truncated_json_is_invalid_payload() {
    let err = n400_service()
        .handle("n-400", br#"{"lastName":"smi"#)
        .expect_err("body is truncated");
    assert!(matches!(
        err,
        FormFillError::InvalidPayload(PayloadError::Malformed(_))
    ));
    assert_eq!(err.kind(), "invalid_payload");
}

#[test]
fn reject_policy_refuses_unknown_keys() {
    let service = service_with(n400_store(), UnknownFieldPolicy::Reject);
    let err = service
        .handle("n-400", br#"{"lastName":"x","maritalStatus":"married"}"#)
        .expect_err("unknown key rejected");
    match err {
        FormFillError::InvalidPayload(PayloadError::UnknownAttributes(keys)) => {
            assert_eq!(keys, vec!["maritalStatus".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn ignore_policy_fills_despite_unknown_keys() {
    let values = filled_values(r#"{"lastName":"x","maritalStatus":"married"}"#);
    assert_eq!(values.get(SURNAME_FIELD).map(String::as_str), Some("X"));
    assert_eq!(values.get(UNMAPPED_FIELD).map(String::as_str), Some("SINGLE"));
}

#[test]
fn intake_fields_are_derived_before_mapping() {
    let values = filled_values(
        r#"{"fullName":"maria del carmen lopez","dateOfBirth":"1990-04-07","addressLine1":"12 elm st"}"#,
    );
    assert_eq!(values.get(SURNAME_FIELD).map(String::as_str), Some("LOPEZ"));
    assert_eq!(
        values
            .get("form1[0].#subform[1].Part2Line4a_MiddleName[0]")
            .map(String::as_str),
        Some("DEL CARMEN")
    );
    assert_eq!(
        values
            .get("form1[0].#subform[1].P2_Line8_DateOfBirth[0]")
            .map(String::as_str),
        Some("04/07/1990")
    );
    assert_eq!(
        values
            .get("form1[0].#subform[2].P4_Line1_Number[0]")
            .map(String::as_str),
        Some("12")
    );
    assert_eq!(
        values
            .get("form1[0].#subform[2].P4_Line1_StreetName[0]")
            .map(String::as_str),
        Some("ELM ST")
    );
}

#[test]
fn single_line_address_fills_every_residence_field() {
    let body = r#"{"address":"4100 W Irving Park Rd, Chicago, IL 60641, USA"}"#;
    let service = service_with(n400_store(), UnknownFieldPolicy::Reject);
    let document = service
        .handle("n-400", body.as_bytes())
        .expect("address is not an unknown key");
    let values = read_back(&document.bytes).expect("filled document readable");

    let expected = [
        ("Number", "4100"),
        ("StreetName", "W IRVING PARK RD"),
        ("City", "CHICAGO"),
        ("State", "IL"),
        ("ZipCode", "60641"),
        ("Country", "USA"),
    ];
    for (suffix, value) in expected {
        let field = format!("form1[0].#subform[2].P4_Line1_{suffix}[0]");
        assert_eq!(values.get(&field).map(String::as_str), Some(value), "{field}");
    }
}

#[test]
fn corrupt_template_is_form_engine_error() {
    let store = InMemoryTemplateStore::new().with_template("N-400", b"%PDF-broken".to_vec());
    let err = service_with(store, UnknownFieldPolicy::Ignore)
        .handle("n-400", b"")
        .expect_err("template cannot be parsed");
    assert!(matches!(err, FormFillError::FormEngine(AcroFormError::Parse(_))));
}

#[test]
fn template_missing_a_mapped_field_fails_without_output() {
    let template = TemplateBuilder::new().field(SURNAME_FIELD, "").build();
    let store = InMemoryTemplateStore::new().with_template("N-400", template);
    let err = service_with(store, UnknownFieldPolicy::Ignore)
        .handle("n-400", b"{}")
        .expect_err("template is from another revision");
    assert!(matches!(
        err,
        FormFillError::FormEngine(AcroFormError::UnknownField(_))
    ));
}

#[test]
fn missing_targets_reports_revision_mismatch() {
    let service = n400_service();
    assert!(service
        .engine()
        .missing_targets(&N400)
        .expect("template readable")
        .is_empty());

    let template = TemplateBuilder::new().field(SURNAME_FIELD, "").build();
    let store = InMemoryTemplateStore::new().with_template("N-400", template);
    let service = service_with(store, UnknownFieldPolicy::Ignore);
    let missing = service
        .engine()
        .missing_targets(&N400)
        .expect("template readable");
    assert_eq!(missing.len(), N400.targets().count() - 1);
    assert!(!missing.contains(&SURNAME_FIELD));
}

#[test]
fn concurrent_fills_share_one_template() {
    let service: Arc<FormFillService<InMemoryTemplateStore>> = n400_service();
    let names = ["alpha", "bravo", "charlie", "delta"];

    std::thread::scope(|scope| {
        let handles: Vec<_> = names
            .iter()
            .map(|name| {
                let service = Arc::clone(&service);
                scope.spawn(move || {
                    let body = format!(r#"{{"lastName":"{name}"}}"#);
                    let document = service
                        .handle("n-400", body.as_bytes())
                        .expect("fill succeeds");
                    let values = read_back(&document.bytes).expect("readable");
                    (name.to_uppercase(), values.get(SURNAME_FIELD).cloned())
                })
            })
            .collect();

        for handle in handles {
            let (expected, actual) = handle.join().expect("fill thread completes");
            assert_eq!(actual, Some(expected));
        }
    });
}

#[test]
fn repeated_fills_produce_identical_values() {
    let body = r#"{"lastName":"smith","phone":"555 0100"}"#;
    assert_eq!(filled_values(body), filled_values(body));
}
