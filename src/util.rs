//! Small utility helpers used across modules.

/// Normalize an email address for lookup: trim surrounding whitespace and
/// lowercase. Two registrations differing only in case hit the same record.
pub fn normalize_email(email: &str) -> String {
  email.trim().to_lowercase()
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request/response payloads. Cuts on a char
/// boundary so multibyte text near the limit cannot panic the slice.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    return s.to_string();
  }
  let mut cut = max;
  while !s.is_char_boundary(cut) {
    cut -= 1;
  }
  format!("{}… ({} bytes total)", &s[..cut], s.len())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn email_normalization_trims_and_lowercases() {
    assert_eq!(normalize_email("  Arjun.Sharma@Student.EDU "), "arjun.sharma@student.edu");
  }

  #[test]
  fn trunc_keeps_short_strings_intact() {
    assert_eq!(trunc_for_log("short", 16), "short");
    assert!(trunc_for_log(&"x".repeat(64), 8).contains("64 bytes total"));
  }

  #[test]
  fn trunc_backs_off_to_a_char_boundary() {
    // "é" is two bytes; a cut at byte 5 lands mid-char and must back off.
    let s = "aaaaéé";
    assert_eq!(trunc_for_log(s, 5), "aaaa… (8 bytes total)");

    let emoji = "🌍🌍🌍🌍".to_string();
    for max in 0..emoji.len() {
      trunc_for_log(&emoji, max);
    }
  }
}
