//! Chart controller.

use chart_cache::{CacheManager, CacheRead};
use chart_core::error::{CacheError, ChartResult};
use chart_core::traits::{Backend, ChartSurface};
use chart_core::types::{DataResponse, Resolution, Sample, Window};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Controller configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Cache responses whose every sample is absent instead of dropping them
    pub retain_absent_responses: bool,
}

/// Resolution used to display `[start, end)`.
pub fn resolution_for(start: i64, end: i64) -> Resolution {
    Resolution::for_span(start, end)
}

/// Owns the visible window and drives the cache, the backend and the chart.
pub struct ChartController<B, S> {
    cache: CacheManager,
    backend: B,
    surface: S,
    window: Window,
    config: ControllerConfig,
}

impl<B: Backend, S: ChartSurface> ChartController<B, S> {
    /// Create a controller showing `[start, end)` with default configuration.
    pub fn new(backend: B, surface: S, start: i64, end: i64) -> ChartResult<Self> {
        Self::with_config(backend, surface, start, end, ControllerConfig::default())
    }

    /// Create a controller showing `[start, end)`.
    ///
    /// The initial fetch is issued immediately and the chart shows gaps until
    /// data arrives.
    pub fn with_config(
        backend: B,
        surface: S,
        start: i64,
        end: i64,
        config: ControllerConfig,
    ) -> ChartResult<Self> {
        let window = Window::new(start, end)?;
        let mut controller = Self {
            cache: CacheManager::new(),
            backend,
            surface,
            window,
            config,
        };
        controller.show(window)?;
        Ok(controller)
    }

    /// Get the visible window.
    pub fn window(&self) -> Window {
        self.window
    }

    /// Get the cache.
    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    /// Get the backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Get the chart surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Move the start of the visible window.
    pub fn set_start_time(&mut self, start: i64) -> ChartResult<()> {
        self.set_window(start, self.window.end)
    }

    /// Move the end of the visible window.
    pub fn set_end_time(&mut self, end: i64) -> ChartResult<()> {
        self.set_window(self.window.start, end)
    }

    /// Move both edges of the visible window at once.
    ///
    /// Panning this way never passes through an intermediate window, so the
    /// resolution only changes when the final span calls for it.
    pub fn set_window(&mut self, start: i64, end: i64) -> ChartResult<()> {
        let window = Window::new(start, end)?;
        self.show(window)
    }

    /// Look `window` up, render what the cache has, fetch what it lacks.
    fn show(&mut self, window: Window) -> ChartResult<()> {
        let lookup = self
            .cache
            .get_data(window.start, window.end, window.resolution)?;

        if let Some(request) = lookup.fetch {
            info!("requesting {} via {}", window, self.backend.name());
            self.backend.request_data(request);
        }

        match lookup.read {
            CacheRead::Native(samples) => self.surface.render(&samples),
            CacheRead::Synthesized { source, samples } => {
                debug!("rendering {} from {} data", window, source);
                self.surface.render(&samples);
            }
            CacheRead::Miss => self.surface.render(&vec![None; window.slot_count()]),
        }

        self.window = window;
        Ok(())
    }

    /// Apply a backend response.
    ///
    /// All-absent responses are dropped unless configured otherwise; either
    /// way the request they answer is resolved. A response matching the
    /// window is rendered as-is; one that merely overlaps it triggers a fresh
    /// read of the whole window.
    pub fn on_data_received(&mut self, response: DataResponse) -> ChartResult<()> {
        let drop_response = response.is_all_absent() && !self.config.retain_absent_responses;
        let DataResponse {
            start,
            end,
            resolution,
            samples,
        } = response;

        if drop_response {
            check_sample_count(start, end, resolution, &samples)?;
            info!("dropping all-absent {} response for [{}, {})", resolution, start, end);
            self.cache.resolve(resolution);
            return self.follow_up();
        }

        self.cache.save_data(start, end, resolution, &samples)?;

        if self.window.matches(start, end, resolution) {
            self.surface.render(&samples);
            return Ok(());
        }

        if self.window.overlaps(start, end) {
            let window = self.window;
            if let Some(merged) = self
                .cache
                .peek(window.start, window.end, window.resolution)?
                .samples()
            {
                debug!("re-rendering {} after overlapping response", window);
                self.surface.render(merged);
            }
        } else {
            debug!("response [{}, {}) is outside {}", start, end, self.window);
        }

        self.follow_up()
    }

    /// Fetch what the window still lacks, unless a fetch at its resolution
    /// is in flight or the gap was already requested.
    fn follow_up(&mut self) -> ChartResult<()> {
        let window = self.window;
        if self.cache.is_pending(window.resolution) {
            return Ok(());
        }
        let Some((gap_start, gap_end)) =
            self.cache
                .missing_span(window.start, window.end, window.resolution)?
        else {
            return Ok(());
        };
        if self
            .cache
            .already_requested(gap_start, gap_end, window.resolution)
        {
            debug!("gap [{}, {}) already requested", gap_start, gap_end);
            return Ok(());
        }

        if let Some(request) =
            self.cache
                .request_missing(window.start, window.end, window.resolution)?
        {
            info!("follow-up request for {}", window);
            self.backend.request_data(request);
        }
        Ok(())
    }
}

fn check_sample_count(
    start: i64,
    end: i64,
    resolution: Resolution,
    samples: &[Sample],
) -> Result<(), CacheError> {
    let expected = resolution.slot_count(start, end);
    if start > end || samples.len() != expected {
        return Err(CacheError::InvalidRange {
            start,
            end,
            resolution,
            expected,
            actual: samples.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chart_cache::RequestState;
    use chart_core::error::ChartError;
    use chart_core::types::DataRequest;

    #[derive(Default)]
    struct MockBackend {
        requests: Vec<DataRequest>,
    }

    impl Backend for MockBackend {
        fn request_data(&mut self, request: DataRequest) {
            self.requests.push(request);
        }

        fn name(&self) -> &str {
            "mock"
        }
    }

    #[derive(Default)]
    struct MockSurface {
        frames: Vec<Vec<Sample>>,
    }

    impl ChartSurface for MockSurface {
        fn render(&mut self, samples: &[Sample]) {
            self.frames.push(samples.to_vec());
        }
    }

    type TestController = ChartController<MockBackend, MockSurface>;

    fn controller(start: i64, end: i64) -> TestController {
        ChartController::new(MockBackend::default(), MockSurface::default(), start, end).unwrap()
    }

    fn ramp(request: &DataRequest, base: f64) -> DataResponse {
        let samples = (0..request.slot_count())
            .map(|i| Some(base + i as f64))
            .collect();
        DataResponse::for_request(request, samples)
    }

    fn last_request(c: &TestController) -> DataRequest {
        *c.backend().requests.last().unwrap()
    }

    fn last_frame(c: &TestController) -> &[Sample] {
        c.surface().frames.last().unwrap()
    }

    #[test]
    fn test_resolution_for_delegates_to_span_rule() {
        assert_eq!(resolution_for(0, 3600), Resolution::Minute1);
        assert_eq!(resolution_for(0, 86_400), Resolution::Minute5);
        assert_eq!(resolution_for(0, 30 * 86_400), Resolution::Hour1);
    }

    #[test]
    fn test_two_hour_window_fetches_and_renders_fine_data() {
        let mut c = controller(0, 7200);

        assert_eq!(c.window().resolution, Resolution::Minute1);
        let request = last_request(&c);
        assert_eq!(
            (request.start, request.end, request.resolution),
            (0, 7200, Resolution::Minute1)
        );
        assert_eq!(c.surface().frames, vec![vec![None; 120]]);

        let response = ramp(&request, 10.0);
        let expected = response.samples.clone();
        c.on_data_received(response).unwrap();

        assert_eq!(last_frame(&c), expected.as_slice());
        assert_eq!(c.cache().request_state(Resolution::Minute1), RequestState::Idle);
        assert_eq!(c.backend().requests.len(), 1);
    }

    #[test]
    fn test_cached_window_renders_without_fetch() {
        let mut c = controller(0, 7200);
        let request = last_request(&c);
        c.on_data_received(ramp(&request, 0.0)).unwrap();

        c.set_start_time(3600).unwrap();

        assert_eq!(c.backend().requests.len(), 1);
        let frame = last_frame(&c);
        assert_eq!(frame.len(), 60);
        assert_eq!(frame[0], Some(60.0));
        assert_eq!(c.window().start, 3600);
    }

    #[test]
    fn test_fine_window_upsamples_cached_medium_data() {
        let mut c = controller(0, 10_800);
        assert_eq!(c.window().resolution, Resolution::Minute5);
        let request = last_request(&c);
        c.on_data_received(ramp(&request, 100.0)).unwrap();

        c.set_end_time(600).unwrap();

        assert_eq!(c.window().resolution, Resolution::Minute1);
        assert_eq!(
            last_frame(&c),
            [[Some(100.0); 5], [Some(101.0); 5]].concat().as_slice()
        );
        // Synthesized data is a stand-in: the fine fetch still goes out.
        let fine = last_request(&c);
        assert_eq!((fine.start, fine.end, fine.resolution), (0, 600, Resolution::Minute1));
        assert!(c.cache().is_pending(Resolution::Minute1));
    }

    #[test]
    fn test_all_absent_response_is_dropped() {
        let mut c = controller(0, 600);
        let request = last_request(&c);

        c.on_data_received(DataResponse::for_request(&request, vec![None; 10]))
            .unwrap();

        assert!(c.cache().store(Resolution::Minute1).is_empty());
        assert!(!c.cache().is_pending(Resolution::Minute1));
        assert_eq!(c.surface().frames.len(), 1);
        // The dropped range is not requested again.
        assert_eq!(c.backend().requests.len(), 1);
    }

    #[test]
    fn test_all_absent_response_is_kept_when_configured() {
        let config = ControllerConfig {
            retain_absent_responses: true,
        };
        let mut c = ChartController::with_config(
            MockBackend::default(),
            MockSurface::default(),
            0,
            600,
            config,
        )
        .unwrap();
        let request = last_request(&c);

        c.on_data_received(DataResponse::for_request(&request, vec![None; 10]))
            .unwrap();

        assert_eq!(
            c.cache().store(Resolution::Minute1).read(0, 600).unwrap(),
            Some(vec![None; 10])
        );
        assert_eq!(last_frame(&c), &[None; 10]);
    }

    #[test]
    fn test_overlapping_response_merges_and_follows_up() {
        let mut c = controller(0, 600);
        let first = last_request(&c);

        // Widen the window while the first fetch is in flight.
        c.set_end_time(1200).unwrap();
        assert_eq!(c.backend().requests.len(), 1);
        assert_eq!(last_frame(&c), &[None; 20]);

        c.on_data_received(ramp(&first, 0.0)).unwrap();
        let second = last_request(&c);
        assert_eq!(c.backend().requests.len(), 2);
        assert_eq!((second.start, second.end), (600, 1200));

        c.on_data_received(ramp(&second, 10.0)).unwrap();
        let expected: Vec<Sample> = (0..20).map(|i| Some(i as f64)).collect();
        assert_eq!(last_frame(&c), expected.as_slice());
        assert_eq!(c.backend().requests.len(), 2);
    }

    #[test]
    fn test_overlapping_response_at_other_resolution_rerenders() {
        let mut c = controller(0, 600);
        let frames_before = c.surface().frames.len();

        let medium = DataRequest {
            id: chart_core::types::RequestId::new(),
            start: 0,
            end: 3600,
            resolution: Resolution::Minute5,
        };
        c.on_data_received(ramp(&medium, 50.0)).unwrap();

        assert_eq!(c.surface().frames.len(), frames_before + 1);
        assert_eq!(last_frame(&c)[0], Some(50.0));
        assert_eq!(last_frame(&c)[9], Some(51.0));
        // The fine fetch is still outstanding, so nothing new is requested.
        assert_eq!(c.backend().requests.len(), 1);
    }

    #[test]
    fn test_stale_response_is_cached_but_not_rendered() {
        let mut c = controller(0, 600);
        let first = last_request(&c);

        c.set_end_time(7200).unwrap();
        c.set_start_time(3600).unwrap();
        let frames = c.surface().frames.len();

        c.on_data_received(ramp(&first, 0.0)).unwrap();

        assert_eq!(c.surface().frames.len(), frames);
        assert!(c.cache().store(Resolution::Minute1).is_complete(0, 600).unwrap());
        let follow_up = last_request(&c);
        assert_eq!((follow_up.start, follow_up.end), (3600, 7200));
    }

    #[test]
    fn test_panning_fine_window_stays_fine() {
        let mut c = controller(0, 7200);
        let first = last_request(&c);
        c.on_data_received(ramp(&first, 0.0)).unwrap();

        c.set_window(60, 7260).unwrap();
        assert_eq!(c.window().resolution, Resolution::Minute1);
        let step = last_request(&c);
        assert_eq!((step.start, step.end), (7200, 7260));
        c.on_data_received(ramp(&step, 120.0)).unwrap();

        c.set_window(-540, 6660).unwrap();
        assert_eq!(c.window().resolution, Resolution::Minute1);

        let requests = &c.backend().requests;
        assert_eq!(requests.len(), 3);
        assert!(requests
            .iter()
            .all(|r| r.resolution == Resolution::Minute1));
        assert_eq!((requests[2].start, requests[2].end), (-540, 0));
        assert_eq!(last_frame(&c).len(), 120);
    }

    #[test]
    fn test_invalid_window_is_rejected() {
        let mut c = controller(0, 7200);

        let err = c.set_start_time(7200).unwrap_err();
        assert!(matches!(err, ChartError::InvalidWindow { start: 7200, end: 7200 }));
        assert_eq!(c.window().start, 0);

        let backwards =
            ChartController::new(MockBackend::default(), MockSurface::default(), 60, 0);
        assert!(backwards.is_err());
    }

    #[test]
    fn test_malformed_response_is_rejected() {
        let mut c = controller(0, 600);
        let request = last_request(&c);

        let err = c
            .on_data_received(DataResponse::for_request(&request, vec![Some(1.0); 3]))
            .unwrap_err();
        assert!(matches!(err, ChartError::Cache(CacheError::InvalidRange { .. })));

        let err = c
            .on_data_received(DataResponse::for_request(&request, vec![None; 3]))
            .unwrap_err();
        assert!(matches!(err, ChartError::Cache(CacheError::InvalidRange { .. })));
        assert!(c.cache().is_pending(Resolution::Minute1));
    }
}
