use quire_core::{
    ApiError, Arguments, Error, Handler, HttpMethod, HttpRequest, Param, Reply, RouteError,
    RouteTable,
};
use serde_json::{Value, json};

fn json_of(reply: Reply) -> Value {
    match reply {
        Reply::Json(value) => value,
        other => panic!("expected JSON reply, got {:?}", other),
    }
}

fn table() -> RouteTable {
    let mut table = RouteTable::new();

    table
        .add_route(
            Handler::new("get_blog", |mut args: Arguments| async move {
                let id: u64 = args.required("id")?;
                let page: Option<u32> = args.optional("page")?;
                Ok::<_, Error>(json!({"id": id, "page": page.unwrap_or(1)}))
            })
            .params([Param::positional("id"), Param::optional("page")])
            .get("/blog/{id}"),
        )
        .unwrap();

    table
        .add_route(
            Handler::new("update_blog", |mut args: Arguments| async move {
                let id: String = args.required("id")?;
                let name: String = args.required("name")?;
                let rest = args.rest();
                Ok::<_, Error>(json!({"id": id, "name": name, "rest": rest}))
            })
            .params([
                Param::positional("id"),
                Param::named("name"),
                Param::var_named("kw"),
            ])
            .post("/api/blogs/{id}"),
        )
        .unwrap();

    table
        .add_route(
            Handler::new("search", |mut args: Arguments| async move {
                let a: String = args.required("a")?;
                let b: String = args.required("b")?;
                let req = args.take_request()?;
                Ok::<_, Error>(json!({"a": a, "b": b, "path": req.path}))
            })
            .params([
                Param::named("a"),
                Param::named("b"),
                Param::request("request"),
            ])
            .get("/search"),
        )
        .unwrap();

    table
        .add_route(
            Handler::new("delete_blog", |_args: Arguments| async {
                Err::<Value, _>(ApiError::new("403", json!({}), "forbidden"))
            })
            .params([Param::positional("id")])
            .post("/api/blogs/{id}/delete"),
        )
        .unwrap();

    table
}

#[tokio::test]
async fn test_path_only_handler() {
    let reply = table()
        .dispatch(HttpRequest::new("GET", "/blog/12"))
        .await
        .unwrap();
    assert_eq!(json_of(reply), json!({"id": 12, "page": 1}));
}

#[tokio::test]
async fn test_query_feeds_optional_named() {
    let reply = table()
        .dispatch(HttpRequest::new("GET", "/blog/12?page=3&other=x"))
        .await
        .unwrap();
    assert_eq!(json_of(reply), json!({"id": 12, "page": 3}));
}

#[tokio::test]
async fn test_repeated_query_key_binds_first() {
    let reply = table()
        .dispatch(HttpRequest::new("GET", "/search?a=1&a=2&b=3"))
        .await
        .unwrap();
    assert_eq!(json_of(reply), json!({"a": "1", "b": "3", "path": "/search"}));
}

#[tokio::test]
async fn test_path_beats_body_and_rest_gets_leftovers() {
    let request = HttpRequest::new("POST", "/api/blogs/7")
        .with_header("content-type", "application/json")
        .with_body(r#"{"id": "99", "name": "Rust", "summary": "s"}"#);
    let reply = table().dispatch(request).await.unwrap();
    assert_eq!(
        json_of(reply),
        json!({"id": "7", "name": "Rust", "rest": {"summary": "s"}})
    );
}

#[tokio::test]
async fn test_form_post() {
    let request = HttpRequest::new("POST", "/api/blogs/7")
        .with_header("Content-Type", "application/x-www-form-urlencoded")
        .with_body("name=Hello+World&tag=a&tag=b");
    let reply = table().dispatch(request).await.unwrap();
    assert_eq!(
        json_of(reply),
        json!({"id": "7", "name": "Hello World", "rest": {"tag": "a"}})
    );
}

#[tokio::test]
async fn test_request_errors() {
    let table = table();

    let no_type = HttpRequest::new("POST", "/api/blogs/7").with_body("{}");
    let err = table.dispatch(no_type).await.unwrap_err();
    assert_eq!(err.reason(), "Missing Content-Type.");

    let array = HttpRequest::new("POST", "/api/blogs/7")
        .with_header("Content-Type", "application/json")
        .with_body("[]");
    let err = table.dispatch(array).await.unwrap_err();
    assert_eq!(err.reason(), "JSON body must be object.");

    let text = HttpRequest::new("POST", "/api/blogs/7")
        .with_header("Content-Type", "text/plain")
        .with_body("name=x");
    let err = table.dispatch(text).await.unwrap_err();
    assert_eq!(err.reason(), "Unsupported Content-Type: text/plain");

    let missing = HttpRequest::new("GET", "/search?a=1");
    let err = table.dispatch(missing).await.unwrap_err();
    assert_eq!(err.reason(), "Missing argument: b");
    assert_eq!(err.status_code(), 400);
}

#[tokio::test]
async fn test_invalid_argument_type() {
    let err = table()
        .dispatch(HttpRequest::new("GET", "/blog/abc"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::BadRequest(ref m) if m == "Invalid argument: id"));
}

#[tokio::test]
async fn test_domain_error_payload() {
    let request = HttpRequest::new("POST", "/api/blogs/7/delete")
        .with_header("Content-Type", "application/json")
        .with_body("{}");
    let reply = table().dispatch(request).await.unwrap();
    assert_eq!(
        json_of(reply),
        json!({"error": "403", "data": {}, "message": "forbidden"})
    );
}

#[test]
fn test_registration_faults() {
    let mut table = table();

    let dup = Handler::new("other", |_args: Arguments| async { "x" }).get("/search");
    assert!(matches!(
        table.add_route(dup),
        Err(RouteError::DuplicateRoute { .. })
    ));

    let untagged = Handler::new("untagged", |_args: Arguments| async { "x" });
    assert!(matches!(
        table.register(HttpMethod::GET, "/untagged", untagged),
        Err(RouteError::MissingRouteMetadata { .. })
    ));

    let bad = Handler::new("bad", |_args: Arguments| async { "x" })
        .params([Param::request("request"), Param::named("q")])
        .get("/bad");
    let err = table.add_route(bad).unwrap_err();
    assert!(matches!(err, RouteError::Signature(_)));
    assert!(err.to_string().contains("bad(request, q)"));
}
