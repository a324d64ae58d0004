//! Oracle functions over a recorded [`Journal`](crate::Journal).
//!
//! Oracles run after a test drives sessions through the simulated queue.
//! They receive the full event sequence and check global invariants that
//! individual assertions would miss.

use itls_core::disabled_header;

use crate::journal::Event;

/// Oracle function type.
///
/// Returns `Err(message)` describing the first violation.
pub type OracleFn = Box<dyn Fn(&[Event]) -> Result<(), String>>;

/// Every granted DMA buffer was released.
pub fn buffers_released() -> OracleFn {
    Box::new(|events| {
        let granted =
            events.iter().filter(|e| matches!(e, Event::Alloc { granted: true, .. })).count();
        let released = events.iter().filter(|e| matches!(e, Event::Release { .. })).count();
        if granted == released {
            Ok(())
        } else {
            Err(format!("{granted} buffers allocated, {released} released"))
        }
    })
}

/// Installs follow prime, fence, write, flush, fence, release.
///
/// An install write is one issued right after a barrier. The live header
/// must already match the staged header when it arrives.
pub fn install_sequence() -> OracleFn {
    Box::new(|events| {
        for (i, event) in events.iter().enumerate() {
            let Event::Write { staged_header, live_header, fault, .. } = *event else {
                continue;
            };
            if i == 0 || events[i - 1] != Event::Barrier {
                continue;
            }
            if live_header != staged_header {
                return Err(format!(
                    "event {i}: live header {live_header:#018x} not primed with {staged_header:#018x}"
                ));
            }

            let rest = &events[i + 1..];
            let expected_tail = match (fault, rest.first()) {
                (Some(_), _) => rest.first().map(|e| matches!(e, Event::Release { .. })),
                (None, Some(Event::Flush { fault: Some(_), .. })) => {
                    rest.get(1).map(|e| matches!(e, Event::Release { .. }))
                },
                (None, Some(Event::Flush { fault: None, .. })) => Some(
                    rest.get(1) == Some(&Event::Barrier)
                        && rest.get(2).is_some_and(|e| matches!(e, Event::Release { .. })),
                ),
                (None, _) => Some(false),
            };
            if expected_tail != Some(true) {
                return Err(format!("event {i}: install write not followed by flush/fence/release"));
            }
        }
        Ok(())
    })
}

/// Every teardown write carries the disabled header, failed or not.
///
/// A teardown write is one issued right after its scratch allocation.
pub fn teardown_headers() -> OracleFn {
    Box::new(|events| {
        let disabled = disabled_header().to_u64();
        for (i, event) in events.iter().enumerate() {
            let Event::Write { staged_header, .. } = *event else {
                continue;
            };
            let after_alloc = i > 0 && matches!(events[i - 1], Event::Alloc { granted: true, .. });
            if after_alloc && staged_header != disabled {
                return Err(format!(
                    "event {i}: teardown header {staged_header:#018x}, expected {disabled:#018x}"
                ));
            }
        }
        Ok(())
    })
}

/// Combine multiple oracles into one.
pub fn all_of(oracles: Vec<OracleFn>) -> OracleFn {
    Box::new(move |events| {
        for oracle in &oracles {
            oracle(events)?;
        }
        Ok(())
    })
}

/// The oracles every lifecycle test should satisfy
pub fn standard() -> OracleFn {
    all_of(vec![buffers_released(), install_sequence(), teardown_headers()])
}
