//! JavaScript evaluation scripts
//!
//! This module contains the JavaScript injected over CDP to observe DOM
//! activity and serialize page content.

/// Install a MutationObserver recording the time of the last mutation
///
/// Structural, attribute, and character-data mutations all bump the
/// timestamp. Returns `{ attached: false }` when there is no document root
/// to observe, which the idle detector treats as immediately idle.
pub const MUTATION_OBSERVER_SCRIPT: &str = r#"
    (() => {
        if (window.__courierIdle && window.__courierIdle.attached) {
            window.__courierIdle.last = Date.now();
            return { attached: true };
        }
        const root = document.documentElement || document.body;
        if (!root) {
            return { attached: false };
        }
        const state = { last: Date.now(), attached: true };
        try {
            const observer = new MutationObserver(() => {
                state.last = Date.now();
            });
            observer.observe(root, {
                childList: true,
                subtree: true,
                attributes: true,
                characterData: true
            });
        } catch (e) {
            return { attached: false };
        }
        window.__courierIdle = state;
        return { attached: true };
    })()
"#;

/// Milliseconds since the last observed mutation, or null if not installed
pub const IDLE_PROBE_SCRIPT: &str = r"
    (() => {
        const state = window.__courierIdle;
        if (!state || !state.attached) {
            return null;
        }
        return Date.now() - state.last;
    })()
";

/// Current document readiness, polled while waiting for page load
pub const READY_STATE_SCRIPT: &str = r"
    (() => {
        return {
            readyState: document.readyState,
            bodyExists: document.body !== null
        };
    })()
";

/// Serialize the document to a string
///
/// Prefers the root element's outer markup, falls back to the body. A
/// document with neither is an in-band error, as are thrown exceptions,
/// so the caller never sees an empty capture pass as success.
pub const SERIALIZE_DOCUMENT_SCRIPT: &str = r#"
    (() => {
        try {
            if (!document.documentElement && !document.body) {
                return { ok: false, html: '', textLen: 0, error: 'no document root' };
            }
            const html = document.documentElement
                ? document.documentElement.outerHTML
                : document.body.outerHTML;
            const text = document.body ? (document.body.innerText || '') : '';
            return { ok: true, html: html, textLen: text.length, error: null };
        } catch (e) {
            return { ok: false, html: '', textLen: 0, error: String(e) };
        }
    })()
"#;
