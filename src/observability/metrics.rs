use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub assign_requests_total: IntCounterVec,
    pub orders_assigned_total: IntCounter,
    pub orders_released_total: IntCounter,
    pub orders_completed_total: IntCounter,
    pub batch_rejections_total: IntCounterVec,
    pub assignment_latency_seconds: Histogram,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let assign_requests_total = IntCounterVec::new(
            Opts::new("assign_requests_total", "Assign requests by outcome"),
            &["outcome"],
        )
        .expect("valid assign_requests_total metric");

        let orders_assigned_total =
            IntCounter::new("orders_assigned_total", "Orders handed to couriers")
                .expect("valid orders_assigned_total metric");

        let orders_released_total = IntCounter::new(
            "orders_released_total",
            "Orders returned to the pool after a courier update",
        )
        .expect("valid orders_released_total metric");

        let orders_completed_total =
            IntCounter::new("orders_completed_total", "Orders marked complete")
                .expect("valid orders_completed_total metric");

        let batch_rejections_total = IntCounterVec::new(
            Opts::new("batch_rejections_total", "Rejected insert batches by kind"),
            &["kind"],
        )
        .expect("valid batch_rejections_total metric");

        let assignment_latency_seconds = Histogram::with_opts(HistogramOpts::new(
            "assignment_latency_seconds",
            "Time spent matching and assigning orders for one courier",
        ))
        .expect("valid assignment_latency_seconds metric");

        registry
            .register(Box::new(assign_requests_total.clone()))
            .expect("register assign_requests_total");
        registry
            .register(Box::new(orders_assigned_total.clone()))
            .expect("register orders_assigned_total");
        registry
            .register(Box::new(orders_released_total.clone()))
            .expect("register orders_released_total");
        registry
            .register(Box::new(orders_completed_total.clone()))
            .expect("register orders_completed_total");
        registry
            .register(Box::new(batch_rejections_total.clone()))
            .expect("register batch_rejections_total");
        registry
            .register(Box::new(assignment_latency_seconds.clone()))
            .expect("register assignment_latency_seconds");

        Self {
            registry,
            assign_requests_total,
            orders_assigned_total,
            orders_released_total,
            orders_completed_total,
            batch_rejections_total,
            assignment_latency_seconds,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
