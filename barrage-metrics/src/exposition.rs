//! Text exposition of a registry

use prometheus::{Encoder, Registry, TextEncoder};

use crate::error::MetricsError;

/// Render every family gathered from `registry`.
///
/// Returns the content type to send alongside the encoded body.
pub fn render(registry: &Registry) -> Result<(String, Vec<u8>), MetricsError> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder
        .encode(&registry.gather(), &mut buffer)
        .map_err(MetricsError::Exposition)?;
    Ok((encoder.format_type().to_string(), buffer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MetricId;
    use crate::registrar::MetricRegistrar;

    #[test]
    fn test_render_text_format() {
        let metrics = MetricRegistrar::new(Registry::new(), "barrage").register().unwrap();
        metrics
            .gauge(MetricId::ResSuccessRatio)
            .unwrap()
            .with_label_values(&["t1", "50", "10s"])
            .set(0.96);

        let (content_type, body) = render(metrics.registry()).unwrap();
        let text = String::from_utf8(body).unwrap();

        assert!(content_type.starts_with("text/plain"));
        assert!(text.contains("# TYPE barrage_response_success_ratio gauge"));
        assert!(text.contains("barrage_response_success_ratio{duration=\"10s\",id=\"t1\",rate=\"50\"} 0.96"));
    }

    #[test]
    fn test_render_empty_registry() {
        let (_, body) = render(&Registry::new()).unwrap();
        assert!(body.is_empty());
    }
}
