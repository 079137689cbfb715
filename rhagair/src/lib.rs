/*! Next-word prediction for Welsh.

Predicts the word being typed from the words before it, using scores from
an n-gram frequency store. Welsh spelling is handled by tokenizing into
letters (including the digraphs `ch`, `dd`, `ff`, `ng`, `ll`, `ph`, `rh`
and `th`), and by also matching common misspellings and mutated forms of
what has been typed so far.

# Usage examples

```no_run
use std::path::Path;
use rhagair::predictor::{Predictor, PredictorConfig};
use rhagair::tokenizer::Tokenize;

let predictor = Predictor::new(PredictorConfig::default());
predictor.initialize(Path::new("/usr/share/rhagair/cy"))?;

let context = "bore da, sut wyt ti heddi".context_words();
for prediction in predictor.predict(&context[..], 5)? {
    println!("{} {}", prediction.value(), prediction.score());
}

predictor.cleanup();
# Ok::<(), rhagair::predictor::PredictorError>(())
```

Further examples can be found in [`rhagair-bin`] in the same repository.

[`rhagair-bin`]: (https://github.com/divvun/rhagair)

*/

pub mod predictor;
pub mod spelling;
pub mod store;
pub mod tokenizer;
pub mod wildcard;

pub mod types;

pub use crate::predictor::prediction::Prediction;
pub use crate::predictor::{Predictor, PredictorConfig, PredictorError};
pub use crate::store::{FrequencyStore, StoreError};

/// Sends log output to stderr, filtered by `RUST_LOG`, for hosts that do
/// not install a logger themselves. Calling it again has no effect.
#[cfg(feature = "logging")]
pub fn enable_logging() {
    let _ = env_logger::try_init();
}
