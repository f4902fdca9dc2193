/// Boundary preference for recursive splitting: paragraph, sentence, word.
/// Anything still too large after the last level gets hard character cuts.
const SEPARATORS: [&str; 5] = ["\n\n", ". ", "! ", "? ", " "];

/// Splits text into overlapping chunks, preferring natural boundaries so
/// chunks stay semantically coherent.
#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextSplitter {
    /// `chunk_overlap` is clamped below `chunk_size`; a zero stride would
    /// never advance.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            chunk_overlap: chunk_overlap.min(chunk_size - 1),
        }
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }
        if char_len(text) <= self.chunk_size {
            return vec![text.to_string()];
        }
        self.split_recursive(text, &SEPARATORS)
    }

    fn split_recursive(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let Some((separator, rest)) = separators.split_first() else {
            return self.split_windows(text);
        };

        let segments = split_keeping_separator(text, separator);
        if segments.len() <= 1 {
            return self.split_recursive(text, rest);
        }

        let mut chunks = Vec::new();
        let mut current = String::new();
        for segment in segments {
            if !current.is_empty()
                && char_len(&current) + char_len(segment) > self.chunk_size
            {
                let finished = std::mem::take(&mut current);
                let tail = tail_chars(&finished, self.chunk_overlap);
                self.emit(&mut chunks, finished, rest);
                current = tail;
            }
            current.push_str(segment);
        }
        if !current.is_empty() {
            self.emit(&mut chunks, current, rest);
        }

        chunks
    }

    fn emit(&self, chunks: &mut Vec<String>, piece: String, rest: &[&str]) {
        if char_len(&piece) > self.chunk_size {
            chunks.extend(self.split_recursive(&piece, rest));
        } else {
            chunks.push(piece);
        }
    }

    /// Hard character windows, the last-resort level. The stride is
    /// `chunk_size - chunk_overlap`, so consecutive windows overlap by
    /// exactly `chunk_overlap` characters.
    fn split_windows(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        let step = self.chunk_size - self.chunk_overlap;

        let mut chunks = Vec::new();
        let mut start = 0;
        while start < chars.len() {
            let end = (start + self.chunk_size).min(chars.len());
            chunks.push(chars[start..end].iter().collect());
            if end == chars.len() {
                break;
            }
            start += step;
        }
        chunks
    }
}

/// Split at a separator, keeping the separator attached to the preceding
/// segment so no characters are lost.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    let mut segments = Vec::new();
    let mut start = 0;

    while let Some(pos) = text[start..].find(separator) {
        let end = start + pos + separator.len();
        segments.push(&text[start..end]);
        start = end;
    }
    if start < text.len() {
        segments.push(&text[start..]);
    }

    segments
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn tail_chars(text: &str, count: usize) -> String {
    if count == 0 {
        return String::new();
    }
    let chars: Vec<char> = text.chars().collect();
    let start = chars.len().saturating_sub(count);
    chars[start..].iter().collect()
}
