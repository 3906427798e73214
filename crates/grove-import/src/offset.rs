//! Resume offsets
//!
//! Progress is recorded in lines but applied in chunks. These two functions
//! convert between the two.

/// Index of the first chunk still to merge after `lines_completed` lines.
///
/// Floor division: the recorded count always falls on a chunk boundary except
/// after the final, shorter chunk, where the caller treats the import as done.
pub fn resume_offset(lines_completed: usize, chunk_size: usize) -> usize {
    lines_completed / chunk_size.max(1)
}

/// Lines completed once the chunk at `index` is durable, clamped to the
/// outline's total so a short final chunk never overshoots it.
pub fn lines_after_chunk(index: usize, chunk_size: usize, total_lines: usize) -> usize {
    ((index + 1) * chunk_size.max(1)).min(total_lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resume_offset_floors() {
        assert_eq!(resume_offset(0, 20), 0);
        assert_eq!(resume_offset(20, 20), 1);
        assert_eq!(resume_offset(40, 20), 2);
        assert_eq!(resume_offset(47, 20), 2);
    }

    #[test]
    fn test_lines_after_chunk_clamps() {
        let progress: Vec<usize> = (0..3).map(|i| lines_after_chunk(i, 20, 47)).collect();
        assert_eq!(progress, vec![20, 40, 47]);
    }

    #[test]
    fn test_offset_roundtrips_progress() {
        for index in 0..2 {
            let lines = lines_after_chunk(index, 20, 47);
            assert_eq!(resume_offset(lines, 20), index + 1);
        }
    }
}
