use xmlrpc_proto::{Document, Fault, Response, Value};

const XXE_PAYLOAD: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>
<!DOCTYPE methodResponse [
  <!ENTITY local SYSTEM \"file:///etc/passwd\">
]>
<methodResponse>
  <params>
    <param>
      <value><string>&local;</string></value>
    </param>
  </params>
</methodResponse>";

fn fault_code(response: &Response) -> Option<i32> {
    response.fault().map(Fault::code)
}

#[test]
fn test_return_value() {
    let mut response = Response::new();
    response.set_return_value("string");
    assert_eq!(Some(&Value::from("string")), response.return_value());

    response.set_return_value(vec!["one", "two"]);
    assert_eq!(
        Some(&Value::Array(vec![Value::from("one"), Value::from("two")])),
        response.return_value()
    );
}

#[test]
fn test_is_fault() {
    let mut response = Response::new();
    assert!(!response.is_fault());
    assert!(response.fault().is_none());

    assert!(!response.load_xml("foo"));
    assert!(response.is_fault());
    assert_eq!(Some(651), fault_code(&response));
}

#[test]
fn test_load_xml() {
    let xml = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
               <methodResponse><params><param><value><string>Return value</string></value></param></params></methodResponse>\n";

    let mut response = Response::new();
    assert!(response.load_xml(xml), "{}", xml);
    assert_eq!(Some("Return value"), response.return_value().and_then(Value::as_str));
}

#[test]
fn test_load_bytes_that_are_not_text() {
    let mut response = Response::new();
    assert!(!response.load_bytes(b"<methodResponse>\xff\xfe</methodResponse>"));
    assert!(response.is_fault());
    assert_eq!(Some(650), fault_code(&response));
}

#[test]
fn test_nil_member_from_server() {
    let raw = "<methodResponse><params><param><value><array><data><value><struct>\
               <member><name>id</name><value><string>1</string></value></member>\
               <member><name>name</name><value><string>birdy num num!</string></value></member>\
               <member><name>description</name><value><nil/></value></member>\
               </struct></value></data></array></value></param></params></methodResponse>";

    let mut response = Response::new();
    assert!(response.load_xml(raw));

    let listing: Value = vec![
        ("id", Value::from("1")),
        ("name", Value::from("birdy num num!")),
        ("description", Value::Nil),
    ]
    .into_iter()
    .collect();
    assert_eq!(Some(&Value::Array(vec![listing])), response.return_value());
}

#[test]
fn test_save_xml() {
    let response = Response::with_return_value("return value");

    for xml in [response.save_xml(), response.to_string()] {
        let document = Document::parse(&xml).unwrap();
        let string = document
            .root()
            .child("params")
            .and_then(|params| params.child("param"))
            .and_then(|param| param.child("value"))
            .and_then(|value| value.child("string"))
            .expect("params/param/value/string");
        assert_eq!("return value", string.text());
    }
}

#[test]
fn test_param_without_value() {
    let mut response = Response::new();
    assert!(!response.load_xml(
        "<?xml version=\"1.0\"?>\n<methodResponse><params><param>foo</param></params></methodResponse>\n"
    ));
    assert!(response.is_fault());
    assert_eq!(Some(653), fault_code(&response));
}

#[test]
fn test_params_without_param() {
    let mut response = Response::new();
    assert!(!response.load_xml(
        "<?xml version=\"1.0\"?>\n<methodResponse><params>foo</params></methodResponse>\n"
    ));
    assert!(response.is_fault());
    assert_eq!(Some(653), fault_code(&response));
}

#[test]
fn test_neither_params_nor_fault() {
    let mut response = Response::new();
    assert!(!response.load_xml(
        "<?xml version=\"1.0\"?>\n<methodResponse><bar>foo</bar></methodResponse>\n"
    ));
    assert!(response.is_fault());
    assert_eq!(Some(652), fault_code(&response));
}

#[test]
fn test_external_entities_are_never_resolved() {
    let mut response = Response::new();
    assert!(!response.load_xml(XXE_PAYLOAD));
    assert_eq!(None, response.return_value());
    assert_eq!(Some(651), fault_code(&response));

    assert!(!response.load_bytes(XXE_PAYLOAD.as_bytes()));
    assert_eq!(Some(651), fault_code(&response));
}

#[test]
fn test_doctype_after_comment_or_pi_is_refused() {
    let body = "<methodResponse><params><param><value><string>&e;</string></value></param></params></methodResponse>";
    let doctypes = [
        "<!DOCTYPE methodResponse [<!ENTITY e \"INJECTED\">]>",
        "<!DOCTYPE methodResponse [<!ENTITY e SYSTEM \"file:///etc/passwd\">]>",
    ];

    for prefix in ["<!-- <x -->", "<?pi <x ?>"] {
        for doctype in doctypes {
            let xml = format!("{}{}{}", prefix, doctype, body);
            let mut response = Response::new();
            assert!(!response.load_xml(&xml), "{}", xml);
            assert_eq!(None, response.return_value());
            assert_eq!(Some(651), fault_code(&response));
        }
    }
}

#[test]
fn test_internal_entity_is_never_expanded() {
    let mut response = Response::new();
    assert!(!response.load_xml(
        "<?xml version=\"1.0\"?>\n\
         <!DOCTYPE methodResponse [<!ENTITY e \"INJECTED\">]>\n\
         <methodResponse><params><param><value><string>&e;</string></value></param></params></methodResponse>"
    ));
    assert_eq!(None, response.return_value());
    assert_eq!(Some(651), fault_code(&response));
}

#[test]
fn test_undeclared_entity_is_a_parse_failure() {
    let mut response = Response::new();
    assert!(!response.load_xml(
        "<methodResponse><params><param><value><string>&local;</string></value></param></params></methodResponse>"
    ));
    assert_eq!(Some(651), fault_code(&response));
}

#[test]
fn test_server_fault() {
    let sent = Response::from_fault(Fault::new(4, "Too many parameters."));
    let xml = sent.save_xml();
    assert!(Fault::is_fault(&xml));

    let mut received = Response::new();
    assert!(!received.load_xml(&xml));
    assert!(received.is_fault());
    assert_eq!(Some(&Fault::new(4, "Too many parameters.")), received.fault());
    assert_eq!(Err(Fault::new(4, "Too many parameters.")), received.into_result());
}

#[test]
fn test_load_replaces_previous_fault() {
    let mut response = Response::new();
    assert!(!response.load_xml("foo"));
    assert!(response.load_xml(
        "<methodResponse><params><param><value><i8>9007199254740993</i8></value></param></params></methodResponse>"
    ));
    assert!(!response.is_fault());
    assert_eq!(Some(&Value::BigInteger(9007199254740993)), response.return_value());
}
