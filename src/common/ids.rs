// src/common/ids.rs
//! Prefixed Crockford Base32 identifiers and URL slugs
//!
//! Job ids look like `J_K7NP3X`. The alphabet drops I, L, O and U so ids can be
//! read out loud without ambiguity.

use rand::Rng;

/// Crockford Base32 alphabet (excludes I, L, O, U to avoid confusion)
const CROCKFORD_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

const JOB_PREFIX: &str = "J";

/// Longest slug produced before a disambiguating suffix is added
const MAX_SLUG_LEN: usize = 80;

fn generate_crockford_string(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| CROCKFORD_ALPHABET[rng.gen_range(0..32)] as char)
        .collect()
}

/// Generate a Job ID (J_XXXXXX)
pub fn generate_job_id() -> String {
    format!("{}_{}", JOB_PREFIX, generate_crockford_string(6))
}

/// Lower-case random suffix used to make a slug unique
pub fn slug_suffix() -> String {
    generate_crockford_string(5).to_lowercase()
}

/// Turns free text into a URL slug: ASCII alphanumerics separated by single dashes
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
        if slug.len() >= MAX_SLUG_LEN {
            break;
        }
    }

    slug.trim_end_matches('-').to_string()
}
