use crate::handler::{Handler, HandlerResult};
use crate::Context;
use async_trait::async_trait;
use futures::future::poll_fn;
use futures::FutureExt;
use http::StatusCode;
use once_cell::sync::Lazy;
use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use tracing::error;

thread_local! {
    /// backtrace of the last panic raised on this thread under a recovery barrier
    static PANIC_BACKTRACE: RefCell<Option<Backtrace>> = const { RefCell::new(None) };
    /// number of recovery barriers currently polling on this thread
    static GUARDED: Cell<usize> = const { Cell::new(0) };
}

/// Records the backtrace of panics raised under a barrier, then hands over to the previous hook.
static PANIC_HOOK: Lazy<()> = Lazy::new(|| {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        if GUARDED.with(Cell::get) > 0 {
            let backtrace = Backtrace::force_capture();
            PANIC_BACKTRACE.with(|slot| *slot.borrow_mut() = Some(backtrace));
        }
        previous(info);
    }));
});

/// Marks the current thread as polling under a barrier until dropped
struct Guarded;

impl Guarded {
    fn enter() -> Self {
        GUARDED.with(|depth| depth.set(depth.get() + 1));
        Guarded
    }
}

impl Drop for Guarded {
    fn drop(&mut self) {
        GUARDED.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

/// Frames of the capture itself, this hook and the panic runtime, which sit on top of every trace
const PANIC_MACHINERY: &[&str] = &[
    "std::backtrace",
    "micro_router::middleware::recovery",
    "std::panicking",
    "core::panicking",
    "std::sys::backtrace",
    "rust_begin_unwind",
    "__rustc::rust_begin_unwind",
    "<alloc::boxed::Box<F,A> as core::ops::function::Fn<Args>>::call",
];

/// Drops the leading frames that belong to [`PANIC_MACHINERY`], keeping the panicking code on top
fn trim_panic_frames(trace: &str) -> String {
    let mut frames: Vec<Vec<&str>> = Vec::new();
    for line in trace.lines() {
        let is_frame_header = line.trim_start().split_once(": ").is_some_and(|(index, _)| index.parse::<usize>().is_ok());
        match frames.last_mut() {
            Some(frame) if !is_frame_header => frame.push(line),
            _ => frames.push(vec![line]),
        }
    }

    let skip = frames
        .iter()
        .take_while(|frame| frame.first().is_some_and(|header| PANIC_MACHINERY.iter().any(|marker| header.contains(marker))))
        .count();
    frames[skip..].iter().flatten().copied().collect::<Vec<_>>().join("\n")
}

/// A fault barrier around the rest of the chain.
///
/// Errors returned and panics raised by any later handler are logged together with
/// their backtrace, whatever was written to the response is dropped, and the request is
/// answered with `500 {"message": "Internal Server Error"}`. The task serving the
/// connection keeps running.
///
/// Only panics raised while the barrier polls the chain have their backtrace captured.
/// The frames of the capture and of the panic runtime are trimmed, so a trace starts at
/// the code that panicked.
///
/// Register it before every other middleware so it wraps all of them.
#[derive(Debug, Clone, Copy)]
pub struct Recovery {
    _private: (),
}

impl Recovery {
    pub fn new() -> Self {
        Lazy::force(&PANIC_HOOK);
        Self { _private: () }
    }
}

impl Default for Recovery {
    fn default() -> Self {
        Self::new()
    }
}

pub fn recovery() -> Recovery {
    Recovery::new()
}

#[async_trait]
impl Handler for Recovery {
    async fn call(&self, ctx: &mut Context) -> HandlerResult {
        let mut chain = Box::pin(AssertUnwindSafe(ctx.next()).catch_unwind());
        let outcome = poll_fn(|cx| {
            let _guarded = Guarded::enter();
            chain.as_mut().poll(cx)
        })
        .await;
        drop(chain);

        let message = match outcome {
            Ok(Ok(())) => return Ok(()),
            Ok(Err(e)) => trace(&e.to_string(), &e.backtrace().to_string()),
            Err(payload) => {
                let backtrace = PANIC_BACKTRACE.with(|slot| slot.borrow_mut().take());
                let backtrace = backtrace.map(|backtrace| trim_panic_frames(&backtrace.to_string())).unwrap_or_default();
                trace(&panic_message(payload.as_ref()), &backtrace)
            }
        };

        error!(method = %ctx.method(), path = ctx.path(), "{message}");
        ctx.reset_response();
        ctx.fail(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error");
        Ok(())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_owned()
    }
}

fn trace(message: &str, backtrace: &str) -> String {
    format!("{message}\nTraceback:\n{backtrace}")
}
