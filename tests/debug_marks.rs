//! Integration tests for debug marks and the debug view

use trellis::{resolve, resolve_with_config, Eval, Provider, ResolveConfig, ResolveError, Value};

#[test]
fn test_marks_wrap_string_resolutions() {
    let template = Provider::new("root")
        .value("greeting", "hello")
        .callable("main", |cap, _| Ok(Eval::Ready(cap.call("greeting", &[])?)));

    let config = ResolveConfig::new().with_debug_marks(true);
    let value = resolve_with_config(template, config).unwrap();
    insta::assert_snapshot!(
        value.to_string(),
        @r"<!--main@root--><!--greeting@root-->hello<!--\greeting@root--><!--\main@root-->"
    );
}

#[test]
fn test_marks_name_the_defining_provider() {
    let template = Provider::new("page")
        .with_parent(Provider::new("base").value("greeting", "hi"));

    let config = ResolveConfig::new()
        .with_entrypoint("greeting")
        .with_debug_marks(true);
    let value = resolve_with_config(template, config).unwrap();
    insta::assert_snapshot!(
        value.to_string(),
        @r"<!--greeting@base-->hi<!--\greeting@base-->"
    );
}

#[test]
fn test_marks_leave_non_string_values_alone() {
    let template = Provider::new("root")
        .value("number", 42)
        .value("flag", true)
        .value("nothing", Value::Null)
        .value("list", vec!["a", "b"])
        .callable("main", |cap, _| {
            Ok(Eval::ready(Value::Array(vec![
                cap.call("number", &[])?,
                cap.call("flag", &[])?,
                cap.call("nothing", &[])?,
                cap.call("list", &[])?,
            ])))
        });

    let config = ResolveConfig::new().with_debug_marks(true);
    let value = resolve_with_config(template, config).unwrap();
    assert_eq!(
        value,
        Value::Array(vec![
            Value::from(42),
            Value::from(true),
            Value::Null,
            Value::from(vec!["a", "b"]),
        ])
    );
}

#[test]
fn test_marks_off_by_default() {
    let template = Provider::new("root").value("main", "plain");
    assert_eq!(resolve(template).unwrap(), Value::from("plain"));
}

#[test]
fn test_debug_view_reports_render_state() {
    let context = Provider::new("request");
    let template = Provider::new("root").callable("main", |cap, _| {
        let view = cap.debug();
        assert_eq!(view.entrypoint(), "main");
        assert_eq!(view.template_chain().id(), "root");
        assert_eq!(view.context_chain().map(|p| p.id()), Some("request"));
        assert!(!view.debug_marks());
        assert_eq!(view.print_stack(), "main@root");
        Ok(Eval::ready("ok"))
    });

    let config = ResolveConfig::new().with_context(context);
    assert_eq!(
        resolve_with_config(template, config).unwrap(),
        Value::from("ok")
    );
}

#[test]
fn test_debug_meta_location_yields_view() {
    let template = Provider::new("root").callable("main", |cap, _| {
        match cap.call("debug", &[])? {
            Value::Debug(view) => Ok(Eval::ready(view.print_stack())),
            other => Err(ResolveError::message(format!(
                "expected debug view, got {}",
                other.type_name()
            ))),
        }
    });

    assert_eq!(resolve(template).unwrap(), Value::from("main@root"));
}

#[test]
fn test_toggling_marks_mid_render_affects_later_output() {
    let template = Provider::new("root")
        .value("greeting", "hello")
        .callable("main", |cap, _| {
            let before = cap.call("greeting", &[])?;
            cap.debug().set_debug_marks(true);
            let after = cap.call("greeting", &[])?;
            Ok(Eval::ready(format!("{}|{}", before, after)))
        });

    // The flag is shared for the rest of the render, so the entrypoint's own
    // string result is wrapped too.
    let value = resolve(template).unwrap();
    insta::assert_snapshot!(
        value.to_string(),
        @r"<!--main@root-->hello|<!--greeting@root-->hello<!--\greeting@root--><!--\main@root-->"
    );
}

#[test]
fn test_stack_trace_lists_frames_most_recent_first() {
    let base = Provider::new("base")
        .callable("inner", |cap, _| Ok(Eval::ready(cap.debug().print_stack())));
    let template = Provider::new("page")
        .callable("main", |cap, _| Ok(Eval::Ready(cap.call("inner", &[])?)))
        .with_parent(base);

    assert_eq!(
        resolve(template).unwrap(),
        Value::from("inner@base, main@page")
    );
}
