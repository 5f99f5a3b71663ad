//! Inclusive date-window filtering.

use tracing::debug;

use crate::{DateWindow, Event, PricePoint, TradingDate};

/// Anything carrying a calendar date.
///
/// `None` means the item's date is unavailable (e.g. unparsable), and such an
/// item never passes a window.
pub trait Dated {
    fn trading_date(&self) -> Option<TradingDate>;
}

impl Dated for PricePoint {
    fn trading_date(&self) -> Option<TradingDate> {
        Some(self.date)
    }
}

impl Dated for Event {
    fn trading_date(&self) -> Option<TradingDate> {
        Some(self.date)
    }
}

impl<T: Dated> Dated for &T {
    fn trading_date(&self) -> Option<TradingDate> {
        (**self).trading_date()
    }
}

/// Returns the items dated within `window`, both ends included, in their
/// original order.
pub fn filter_window<T>(items: &[T], window: &DateWindow) -> Vec<T>
where
    T: Dated + Clone,
{
    if window.is_inverted() {
        debug!(start = %window.start, end = %window.end, "inverted window, nothing to show");
        return Vec::new();
    }

    items
        .iter()
        .filter(|item| item.trading_date().is_some_and(|date| window.contains(date)))
        .cloned()
        .collect()
}
