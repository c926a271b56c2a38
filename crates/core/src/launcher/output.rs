use encoding_rs::{EUC_JP, SHIFT_JIS};

/// Decodes child output for logging.
///
/// Console programs on Japanese Windows installs write in the ANSI code page,
/// so non-UTF-8 output is tried as Shift_JIS and then EUC-JP before falling
/// back to lossy UTF-8.
pub fn decode_output(bytes: &[u8]) -> String {
	if let Ok(text) = std::str::from_utf8(bytes) {
		return text.to_string();
	}

	for encoding in [SHIFT_JIS, EUC_JP] {
		let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
		if !had_errors {
			return text.into_owned();
		}
	}

	String::from_utf8_lossy(bytes).into_owned()
}
