//! Small shared helpers

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock a mutex, recovering the guard if a previous holder panicked
///
/// All critical sections in this crate are short synchronous updates that
/// leave the protected state consistent between statements, so a poisoned
/// lock still holds usable data.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Format a price for display
///
/// Always carries a fractional part, so whole prices read "10.0".
///
/// # Examples
///
/// ```
/// use productlist_core::utils::format_price;
///
/// assert_eq!(format_price(9.99), "9.99");
/// assert_eq!(format_price(10.0), "10.0");
/// ```
pub fn format_price(price: f64) -> String {
    format!("{:?}", price)
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_lock_recovers_from_poison() {
        let mutex = Arc::new(Mutex::new(5));
        let poisoner = Arc::clone(&mutex);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("poison the lock");
        })
        .join();

        assert!(mutex.is_poisoned());
        assert_eq!(*lock(&mutex), 5);
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(0.0), "0.0");
        assert_eq!(format_price(10.0), "10.0");
        assert_eq!(format_price(1.5), "1.5");
        assert_eq!(format_price(1299.99), "1299.99");
    }
}
