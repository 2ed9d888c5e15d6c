#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Forward,
    Backward,
}

#[derive(Debug)]
pub enum Segment {
    /// Hex digits `start..end` of one rendered checksum.
    Slice {
        source: Source,
        start: usize,
        end: usize,
    },
    /// A fixed leading nibble.
    Nibble(char),
}

#[derive(Debug)]
pub struct Group {
    pub width: usize,
    pub segments: Vec<Segment>,
}

#[derive(Debug)]
pub struct GroupLayout {
    pub name: &'static str,
    pub filler: char,
    pub groups: Vec<Group>,
}

impl GroupLayout {
    /// Splices the two rendered checksums into hyphen-joined groups.
    ///
    /// A group whose segments come up short is padded on the right with
    /// `filler`; one that runs long is cut to its width.
    pub fn render(&self, forward: &str, backward: &str) -> String {
        let total: usize = self.groups.iter().map(|g| g.width + 1).sum();
        let mut out = String::with_capacity(total);

        for (i, group) in self.groups.iter().enumerate() {
            if i > 0 {
                out.push('-');
            }

            let mut digits = String::with_capacity(group.width);
            for segment in &group.segments {
                match segment {
                    Segment::Slice { source, start, end } => {
                        let hex = match source {
                            Source::Forward => forward,
                            Source::Backward => backward,
                        };
                        let end = (*end).min(hex.len());
                        if let Some(run) = hex.get(*start..end) {
                            digits.push_str(run);
                        }
                    }
                    Segment::Nibble(c) => digits.push(*c),
                }
            }

            digits.truncate(group.width);
            while digits.len() < group.width {
                digits.push(self.filler);
            }
            out.push_str(&digits);
        }

        out
    }

    pub fn widths(&self) -> Vec<usize> {
        self.groups.iter().map(|g| g.width).collect()
    }
}

fn slice(source: Source, start: usize, end: usize) -> Segment {
    Segment::Slice { source, start, end }
}

pub fn legacy_layout() -> GroupLayout {
    GroupLayout {
        name: "legacy",
        filler: '0',
        groups: vec![
            Group {
                width: 8,
                segments: vec![slice(Source::Forward, 0, 8)],
            },
            Group {
                width: 4,
                segments: vec![slice(Source::Backward, 0, 4)],
            },
            Group {
                width: 4,
                segments: vec![Segment::Nibble('4'), slice(Source::Backward, 5, 8)],
            },
            Group {
                width: 4,
                segments: vec![Segment::Nibble('8'), slice(Source::Forward, 5, 8)],
            },
            Group {
                width: 12,
                segments: vec![slice(Source::Forward, 4, 8), slice(Source::Backward, 4, 8)],
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_widths_are_uuid_shaped() {
        assert_eq!(legacy_layout().widths(), vec![8, 4, 4, 4, 12]);
    }

    #[test]
    fn splices_both_checksums() {
        let rendered = legacy_layout().render("01234567", "89abcdef");
        assert_eq!(rendered, "01234567-89ab-4def-8567-4567cdef0000");
    }

    #[test]
    fn short_sources_are_padded_with_filler() {
        let rendered = legacy_layout().render("12", "");
        assert_eq!(rendered, "12000000-0000-4000-8000-000000000000");
    }
}
