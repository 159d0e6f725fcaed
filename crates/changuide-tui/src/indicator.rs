/// Activity indicator shown while any fetch is in flight
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadIndicator {
    active: u32,
}

impl LoadIndicator {
    pub fn start(&mut self) {
        self.active += 1;
    }

    /// Extra stops are ignored
    pub fn stop(&mut self) {
        self.active = self.active.saturating_sub(1);
    }

    pub fn is_visible(&self) -> bool {
        self.active > 0
    }

    pub fn active(&self) -> u32 {
        self.active
    }

    /// Spinner frame for the given tick count
    pub fn frame(&self, tick: u64) -> &'static str {
        const FRAMES: [&str; 4] = ["|", "/", "-", "\\"];
        if !self.is_visible() {
            return " ";
        }
        FRAMES[(tick % FRAMES.len() as u64) as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlapping_fetches() {
        let mut indicator = LoadIndicator::default();
        indicator.start();
        indicator.start();
        indicator.stop();
        assert!(indicator.is_visible());
        indicator.stop();
        assert!(!indicator.is_visible());
        indicator.stop();
        assert_eq!(indicator.active(), 0);
        assert_eq!(indicator.frame(3), " ");
    }
}
