mod common;

use std::sync::Arc;
use std::thread;

use common::{COMPONENT, body_of, call, widget};
use jpatch_class::{ClassCodec, YamlCodec};
use jpatch_engine::{CollectingSink, Hook, Registry, TransformError, Transformer};

fn registry() -> Registry {
    let mut registry = Registry::new();
    registry
        .register(
            Hook::builder("after-foo")
                .target("com.example.Widget", "tick", "()V")
                .find([call("foo")])
                .insert([call("bar")])
                .build()
                .unwrap(),
        )
        .unwrap();
    registry
}

#[test]
fn unhooked_component_passes_through_undecoded() {
    let transformer = Transformer::new(registry(), YamlCodec);
    // Not valid YAML for a class; would fail if it were decoded.
    let raw = b"\x00\x01not a class";
    assert_eq!(transformer.transform("com/example/Other", raw).unwrap(), raw);
}

#[test]
fn hooked_component_is_patched_and_reencoded() {
    let raw = YamlCodec.encode(&widget()).unwrap();
    let sink = Arc::new(CollectingSink::new());
    let transformer = Transformer::new(registry(), YamlCodec).with_sink(SharedSink(sink.clone()));

    let (bytes, report) = transformer.transform_with_report(COMPONENT, &raw).unwrap();
    assert!(report.is_success());
    assert_ne!(bytes, raw);

    let patched = YamlCodec.decode(&bytes).unwrap();
    assert_eq!(body_of(&patched, "tick", "()V").to_vec()[2], call("bar"));
    assert!(sink.is_empty());
}

#[test]
fn failed_hooks_return_original_bytes() {
    let mut registry = Registry::new();
    registry
        .register(
            Hook::builder("nowhere")
                .target(COMPONENT, "absent", "()V")
                .find([call("foo")])
                .build()
                .unwrap(),
        )
        .unwrap();
    let raw = YamlCodec.encode(&widget()).unwrap();
    let transformer = Transformer::new(registry, YamlCodec).with_sink(CollectingSink::new());
    let (bytes, report) = transformer.transform_with_report(COMPONENT, &raw).unwrap();
    assert_eq!(bytes, raw);
    assert_eq!(report.failed(), 1);
}

#[test]
fn undecodable_hooked_component_is_an_error() {
    let transformer = Transformer::new(registry(), YamlCodec);
    let err = transformer.transform(COMPONENT, b"methods: 7").unwrap_err();
    assert!(matches!(err, TransformError::Decode { ref component, .. } if component == COMPONENT));
}

#[test]
fn shared_between_threads() {
    let transformer = Arc::new(Transformer::new(registry(), YamlCodec).with_sink(CollectingSink::new()));
    let raw = Arc::new(YamlCodec.encode(&widget()).unwrap());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let transformer = Arc::clone(&transformer);
            let raw = Arc::clone(&raw);
            thread::spawn(move || transformer.transform(COMPONENT, &raw).unwrap())
        })
        .collect();
    let outputs: Vec<Vec<u8>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(outputs.windows(2).all(|w| w[0] == w[1]));
}

struct SharedSink(Arc<CollectingSink>);

impl jpatch_engine::DiagnosticSink for SharedSink {
    fn report(&self, diagnostic: &jpatch_engine::Diagnostic) {
        self.0.report(diagnostic);
    }
}

#[test]
fn demo_manifest_patches_demo_class() {
    let demos = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../demos");
    let registry = Registry::from_manifests([demos.join("hooks.yaml")]).unwrap();
    let raw = std::fs::read(demos.join("widget.yaml")).unwrap();
    let transformer = Transformer::new(registry, YamlCodec).with_sink(CollectingSink::new());

    let (bytes, report) = transformer
        .transform_with_report("com.example.Widget", &raw)
        .unwrap();
    assert_eq!(report.applied(), 1);
    assert_eq!(report.failed(), 1);

    let class = YamlCodec.decode(&bytes).unwrap();
    let tick = body_of(&class, "tick", "()V").to_vec();
    assert_eq!(tick.len(), 11);
    assert_eq!(tick[8].to_string(), "aload 0");
    assert_eq!(
        tick[9].to_string(),
        "invokestatic com/example/Hooks.afterRedraw(Lcom/example/Widget;)V"
    );
}
