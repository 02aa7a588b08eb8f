use std::ops::Add;

/// A counter for the buffer sizes of a [`LineStringArray`][super::LineStringArray].
///
/// This can be used to reserve the buffers of a builder before pushing any geometries,
/// so that the flattening pass never reallocates.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineStringCapacity {
    pub(crate) coord_capacity: usize,
    pub(crate) geom_capacity: usize,
}

impl LineStringCapacity {
    pub fn new(coord_capacity: usize, geom_capacity: usize) -> Self {
        Self {
            coord_capacity,
            geom_capacity,
        }
    }

    pub fn new_empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.coord_capacity == 0 && self.geom_capacity == 0
    }

    #[inline]
    pub fn add_line_string(&mut self, maybe_line_string: Option<&geo::LineString>) {
        self.geom_capacity += 1;
        if let Some(line_string) = maybe_line_string {
            self.coord_capacity += line_string.0.len();
        }
    }

    pub fn coord_capacity(&self) -> usize {
        self.coord_capacity
    }

    pub fn geom_capacity(&self) -> usize {
        self.geom_capacity
    }

    pub fn from_line_strings<'a>(
        geoms: impl Iterator<Item = Option<&'a geo::LineString>>,
    ) -> Self {
        let mut counter = Self::new_empty();
        for maybe_line_string in geoms {
            counter.add_line_string(maybe_line_string);
        }
        counter
    }
}

impl Add for LineStringCapacity {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(
            self.coord_capacity + rhs.coord_capacity,
            self.geom_capacity + rhs.geom_capacity,
        )
    }
}
