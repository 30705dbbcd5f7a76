pub mod charset;
pub mod form;
pub mod generator;
pub mod session;
pub mod ui;
pub mod validation;

pub use charset::{CharacterClass, ClassSet};
pub use form::{Action, FormError, FormState, Phase};
pub use generator::{GenerateError, GenerationRequest, Keystream, entropy_bits, generate};
pub use validation::{LengthError, MAX_LENGTH, MIN_LENGTH, PasswordLength, validate_length};
