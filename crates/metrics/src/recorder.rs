//! Recorder installation.

use {anyhow::Result, tracing::info};

/// Renders collected metrics for the `/metrics` endpoint.
#[derive(Clone)]
pub struct MetricsHandle {
    #[cfg(feature = "prometheus")]
    prometheus_handle: metrics_exporter_prometheus::PrometheusHandle,
}

impl MetricsHandle {
    /// Prometheus text exposition format. Empty without the `prometheus`
    /// feature.
    #[must_use]
    pub fn render(&self) -> String {
        #[cfg(feature = "prometheus")]
        {
            self.prometheus_handle.render()
        }
        #[cfg(not(feature = "prometheus"))]
        {
            String::new()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MetricsRecorderConfig {
    pub enabled: bool,
    /// Labels added to every metric.
    pub global_labels: Vec<(String, String)>,
}

/// Install the process-wide recorder. Call once at startup.
///
/// Returns `None` when collection is disabled or no exporter was compiled
/// in; the facade macros then record nothing.
///
/// # Errors
///
/// Fails when a recorder is already installed or the bucket layout is
/// rejected.
pub fn init_metrics(config: MetricsRecorderConfig) -> Result<Option<MetricsHandle>> {
    if !config.enabled {
        info!("metrics collection is disabled");
        return Ok(None);
    }

    #[cfg(feature = "prometheus")]
    {
        let prometheus_handle = prometheus_builder(config)?.install_recorder()?;
        info!("prometheus metrics recorder installed");
        Ok(Some(MetricsHandle { prometheus_handle }))
    }

    #[cfg(not(feature = "prometheus"))]
    {
        info!("built without a metrics exporter, nothing will be recorded");
        Ok(None)
    }
}

#[cfg(feature = "prometheus")]
fn prometheus_builder(
    config: MetricsRecorderConfig,
) -> Result<metrics_exporter_prometheus::PrometheusBuilder> {
    use {
        crate::{buckets, dispatch, http},
        metrics_exporter_prometheus::{Matcher, PrometheusBuilder},
    };

    let mut builder = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(http::REQUEST_DURATION_SECONDS.to_string()),
            buckets::HTTP_DURATION,
        )?
        .set_buckets_for_metric(
            Matcher::Full(dispatch::INVOCATION_DURATION_SECONDS.to_string()),
            buckets::INVOCATION_DURATION,
        )?;
    for (key, value) in config.global_labels {
        builder = builder.add_global_label(key, value);
    }
    Ok(builder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_config_installs_nothing() {
        let handle = init_metrics(MetricsRecorderConfig::default()).unwrap();
        assert!(handle.is_none());
    }

    #[cfg(feature = "prometheus")]
    #[test]
    fn recorded_metrics_render_with_global_labels() {
        use crate::{counter, dispatch, histogram, labels};

        let recorder = prometheus_builder(MetricsRecorderConfig {
            enabled: true,
            global_labels: vec![("instance".into(), "eu-1".into())],
        })
        .unwrap()
        .build_recorder();
        let handle = MetricsHandle {
            prometheus_handle: recorder.handle(),
        };

        metrics::with_local_recorder(&recorder, || {
            counter!(dispatch::PREEMPTIONS_TOTAL, labels::CAPABILITY => "generate_speech")
                .increment(2);
            histogram!(
                dispatch::INVOCATION_DURATION_SECONDS,
                labels::CAPABILITY => "generate_speech"
            )
            .record(0.3);
        });

        let text = handle.render();
        assert!(text.contains("vocalis_dispatch_preemptions_total"), "{text}");
        assert!(text.contains("capability=\"generate_speech\""), "{text}");
        assert!(text.contains("instance=\"eu-1\""), "{text}");
        // Bucketed, so rendered as a histogram rather than a summary.
        assert!(
            text.contains("vocalis_dispatch_invocation_duration_seconds_bucket"),
            "{text}"
        );
    }
}
