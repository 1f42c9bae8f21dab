/// Milliseconds since the Unix epoch, from the host clock.
pub fn wall_clock_ms() -> f64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::now()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs_f64() * 1000.0)
            .unwrap_or(0.0)
    }
}

/// Milliseconds on a clock that only moves forward. Only differences are meaningful.
fn monotonic_ms() -> f64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::now()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        use std::sync::OnceLock;
        use std::time::Instant;

        static ANCHOR: OnceLock<Instant> = OnceLock::new();
        ANCHOR.get_or_init(Instant::now).elapsed().as_secs_f64() * 1000.0
    }
}

/// Section timer for a tick's perf snapshot.
///
/// A disabled timer never reads the clock and reports 0 for every section,
/// so the tick body can time unconditionally.
#[derive(Clone, Copy, Debug)]
pub struct PerfTimer {
    origin_ms: Option<f64>,
    lap_ms: f64,
}

impl PerfTimer {
    pub fn start(enabled: bool) -> Self {
        let origin_ms = enabled.then(monotonic_ms);
        Self { origin_ms, lap_ms: origin_ms.unwrap_or(0.0) }
    }

    pub fn is_enabled(&self) -> bool {
        self.origin_ms.is_some()
    }

    /// Time since the previous lap (or the start), then begin a new lap.
    pub fn lap_ms(&mut self) -> f64 {
        if self.origin_ms.is_none() {
            return 0.0;
        }
        let now = monotonic_ms();
        let lap = now - self.lap_ms;
        self.lap_ms = now;
        lap
    }

    /// Time since the start, laps included.
    pub fn elapsed_ms(&self) -> f64 {
        self.origin_ms.map_or(0.0, |origin| monotonic_ms() - origin)
    }
}
