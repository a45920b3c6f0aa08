/* Node-level tracing of the rendering walk.  With the `render_trace`
 * feature the arguments are forwarded to `log::trace!`; without it the
 * macro expands to a call to an empty inline function so the arguments
 * are never evaluated.
 */
#[cfg(not(feature = "render_trace"))]
#[inline(always)]
pub fn nop() {}

#[cfg(feature = "render_trace")]
#[macro_export]
#[doc(hidden)]
macro_rules! render_trace {
    ($fmt:expr) => {
         ::log::trace!($fmt);
    };
    ($fmt:expr, $( $args:expr ),*) => {
         ::log::trace!($fmt, $( $args ),*);
    };
}

#[cfg(not(feature = "render_trace"))]
#[macro_export]
#[doc(hidden)]
macro_rules! render_trace {
    ($fmt:expr) => { $crate::macros::nop(); };
    ($fmt:expr, $( $args:expr ),*) => { $crate::macros::nop(); };
}
