use super::*;

#[test]
fn test_get_existing_doc() {
    let doc = ErrorDocs::get(ErrorCode::EAM001);
    assert!(doc.unwrap().contains("Argument Fails Pattern"));
}

#[test]
fn test_doc_titles_name_their_code() {
    for &code in ErrorCode::ALL {
        let doc = ErrorDocs::get(code).unwrap();
        assert!(
            doc.starts_with(&format!("# {code}:")),
            "{code} doc must start with its heading"
        );
    }
}

/// Every supported code is documented exactly once.
#[test]
fn test_docs_cover_all_codes() {
    for &code in ErrorCode::ALL {
        assert!(ErrorDocs::get(code).is_some(), "{code} is undocumented");
    }
    assert_eq!(DOCS.len(), ErrorCode::ALL.len());
}
