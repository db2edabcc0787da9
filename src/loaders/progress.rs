use std::io::Read;

/// Bytes read per progress report
pub const CHUNK_SIZE: usize = 64 * 1024;

/// How far an in-flight fetch has got
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Progress {
    /// Loaded fraction in `0.0..=1.0`, total size known
    Fraction(f32),
    /// Total size unknown
    Indeterminate { loaded: u64 },
}

impl Progress {
    pub fn new(loaded: u64, total: Option<u64>) -> Self {
        match total {
            Some(total) if total > 0 => {
                Progress::Fraction((loaded as f64 / total as f64).clamp(0.0, 1.0) as f32)
            }
            _ => Progress::Indeterminate { loaded },
        }
    }

    pub fn percent(&self) -> Option<f32> {
        match self {
            Progress::Fraction(f) => Some(f * 100.0),
            Progress::Indeterminate { .. } => None,
        }
    }

    /// Short text for the loading overlay
    pub fn label(&self) -> String {
        match self {
            Progress::Fraction(f) => format!("{:.0}%", f * 100.0),
            Progress::Indeterminate { loaded } => format!("Loading... {}", format_bytes(*loaded)),
        }
    }
}

pub fn format_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    let b = bytes as f64;
    if b >= MB {
        format!("{:.1} MB", b / MB)
    } else if b >= KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{} B", bytes)
    }
}

/// Reads `reader` to the end in `CHUNK_SIZE` pieces, reporting progress after each
pub fn read_with_progress<R: Read>(
    mut reader: R,
    total: Option<u64>,
    mut on_progress: impl FnMut(Progress),
) -> std::io::Result<Vec<u8>> {
    let mut data = Vec::with_capacity(total.unwrap_or(0).min(1 << 30) as usize);
    let mut chunk = vec![0u8; CHUNK_SIZE];

    on_progress(Progress::new(0, total));
    loop {
        let n = match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        data.extend_from_slice(&chunk[..n]);
        on_progress(Progress::new(data.len() as u64, total));
    }

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fraction_when_total_known() {
        assert_eq!(Progress::new(50, Some(200)), Progress::Fraction(0.25));
        assert_eq!(Progress::new(50, Some(200)).percent(), Some(25.0));
    }

    #[test]
    fn test_indeterminate_without_total() {
        assert_eq!(Progress::new(10, None), Progress::Indeterminate { loaded: 10 });
        assert_eq!(Progress::new(10, Some(0)), Progress::Indeterminate { loaded: 10 });
        assert_eq!(Progress::new(10, None).percent(), None);
    }

    #[test]
    fn test_labels() {
        assert_eq!(Progress::Fraction(0.421).label(), "42%");
        assert_eq!(Progress::Indeterminate { loaded: 2048 }.label(), "Loading... 2.0 KB");
    }

    #[test]
    fn test_read_reports_monotonic_progress_ending_at_one() {
        let bytes = vec![7u8; CHUNK_SIZE * 2 + 10];
        let mut reports = Vec::new();

        let data = read_with_progress(&bytes[..], Some(bytes.len() as u64), |p| reports.push(p)).unwrap();

        assert_eq!(data, bytes);
        assert_eq!(reports.first(), Some(&Progress::Fraction(0.0)));
        assert_eq!(reports.last(), Some(&Progress::Fraction(1.0)));
        let fractions: Vec<f32> = reports.iter().filter_map(|p| p.percent()).collect();
        assert!(fractions.windows(2).all(|w| w[0] <= w[1]));
    }
}
