/*!
 * Translation of FAQ content.
 *
 * - `set`: per-record translation storage, population at creation time
 *   and the fallback rules used by every read
 */

pub mod set;

pub use set::{Field, TranslatedPair, TranslationSet};
