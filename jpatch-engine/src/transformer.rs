use jpatch_class::{ClassCodec, YamlCodec, internal_name};

use crate::diagnostics::{DiagnosticSink, LogSink};
use crate::error::TransformError;
use crate::registry::Registry;
use crate::report::TransformReport;

/// Loader-facing entry point: raw component bytes in, patched bytes out.
pub struct Transformer<C = YamlCodec> {
    registry: Registry,
    codec: C,
    sink: Box<dyn DiagnosticSink>,
}

impl<C: ClassCodec> Transformer<C> {
    /// Diagnostics go to the `log` facade.
    pub fn new(registry: Registry, codec: C) -> Self {
        Self {
            registry,
            codec,
            sink: Box::new(LogSink),
        }
    }

    pub fn with_sink(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Patch one component.
    ///
    /// Components without hooks come back byte-for-byte without being
    /// decoded. Hook failures are reported to the sink and do not fail the
    /// call; only decoding or encoding errors do.
    pub fn transform(&self, component: &str, raw: &[u8]) -> Result<Vec<u8>, TransformError> {
        self.transform_with_report(component, raw)
            .map(|(bytes, _)| bytes)
    }

    /// Like [`transform`](Self::transform), also returning per-hook outcomes.
    pub fn transform_with_report(
        &self,
        component: &str,
        raw: &[u8],
    ) -> Result<(Vec<u8>, TransformReport), TransformError> {
        if !self.registry.has_hooks(component) {
            return Ok((raw.to_vec(), TransformReport::new(internal_name(component))));
        }

        let mut class = self
            .codec
            .decode(raw)
            .map_err(|source| TransformError::Decode {
                component: component.to_string(),
                source,
            })?;
        let report = self.registry.apply(component, &mut class, self.sink.as_ref());
        log::debug!(
            "{}: {} hooks applied, {} failed",
            report.component,
            report.applied(),
            report.failed()
        );
        if !report.is_modified() {
            return Ok((raw.to_vec(), report));
        }

        let bytes = self
            .codec
            .encode(&class)
            .map_err(|source| TransformError::Encode {
                component: component.to_string(),
                source,
            })?;
        Ok((bytes, report))
    }
}
