//! Flat per-particle attribute buffers.
//!
//! Each attribute is a `Vec<f32>` holding `item_size` floats per particle,
//! rebuilt wholesale whenever the particle system publishes. A dirty flag
//! tells the GPU side when the contents must be re-uploaded.

/// One flat attribute stream (positions, sizes or colours).
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeBuffer {
    name: &'static str,
    item_size: usize,
    data: Vec<f32>,
    needs_update: bool,
}

impl AttributeBuffer {
    /// Create an empty attribute with `item_size` components per particle.
    pub fn new(name: &'static str, item_size: usize) -> Self {
        assert!(item_size > 0, "attribute item size must be non-zero");
        Self {
            name,
            item_size,
            data: Vec::new(),
            needs_update: false,
        }
    }

    /// Attribute name, used to label the matching GPU buffer.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Number of floats per particle.
    pub fn item_size(&self) -> usize {
        self.item_size
    }

    /// Number of particles stored.
    pub fn count(&self) -> usize {
        self.data.len() / self.item_size
    }

    /// Raw float data.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Components belonging to particle `index`.
    pub fn item(&self, index: usize) -> Option<&[f32]> {
        let start = index.checked_mul(self.item_size)?;
        let end = start.checked_add(self.item_size)?;
        self.data.get(start..end)
    }

    /// Whether the contents changed since the last [`take_update`](Self::take_update).
    pub fn needs_update(&self) -> bool {
        self.needs_update
    }

    /// Replace the whole buffer and flag it for upload.
    pub fn replace(&mut self, data: Vec<f32>) {
        debug_assert_eq!(data.len() % self.item_size, 0);
        self.data = data;
        self.needs_update = true;
    }

    /// Return the data if it needs uploading, clearing the flag.
    pub fn take_update(&mut self) -> Option<&[f32]> {
        if self.needs_update {
            self.needs_update = false;
            Some(&self.data)
        } else {
            None
        }
    }
}

/// The three parallel attribute streams consumed by the point-sprite pass.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeBuffers {
    /// `x, y, z` per particle.
    pub position: AttributeBuffer,
    /// `size` per particle.
    pub size: AttributeBuffer,
    /// `r, g, b, a` per particle.
    pub colour: AttributeBuffer,
}

impl AttributeBuffers {
    pub const POSITION_STRIDE: usize = 3;
    pub const SIZE_STRIDE: usize = 1;
    pub const COLOUR_STRIDE: usize = 4;

    pub fn new() -> Self {
        Self {
            position: AttributeBuffer::new("position", Self::POSITION_STRIDE),
            size: AttributeBuffer::new("size", Self::SIZE_STRIDE),
            colour: AttributeBuffer::new("colour", Self::COLOUR_STRIDE),
        }
    }

    /// Number of particles described by the buffers.
    pub fn len(&self) -> usize {
        self.size.count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True if any of the three streams is waiting for upload.
    pub fn needs_update(&self) -> bool {
        self.position.needs_update() || self.size.needs_update() || self.colour.needs_update()
    }
}

impl Default for AttributeBuffers {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buffers_are_empty_and_clean() {
        let buffers = AttributeBuffers::new();
        assert!(buffers.is_empty());
        assert!(!buffers.needs_update());
        assert_eq!(buffers.position.item_size(), 3);
        assert_eq!(buffers.size.item_size(), 1);
        assert_eq!(buffers.colour.item_size(), 4);
    }

    #[test]
    fn test_replace_flags_update() {
        let mut attr = AttributeBuffer::new("position", 3);
        attr.replace(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(attr.count(), 2);
        assert!(attr.needs_update());
        assert_eq!(attr.item(1), Some(&[4.0, 5.0, 6.0][..]));
        assert_eq!(attr.item(2), None);
    }

    #[test]
    fn test_item_out_of_range_index() {
        let mut attr = AttributeBuffer::new("colour", 4);
        attr.replace(vec![0.0; 8]);
        assert_eq!(attr.item(usize::MAX), None);
        assert_eq!(attr.item(usize::MAX / 4), None);
    }

    #[test]
    fn test_stream_names() {
        let buffers = AttributeBuffers::new();
        assert_eq!(buffers.position.name(), "position");
        assert_eq!(buffers.size.name(), "size");
        assert_eq!(buffers.colour.name(), "colour");
    }

    #[test]
    fn test_take_update_once() {
        let mut attr = AttributeBuffer::new("size", 1);
        attr.replace(vec![0.5]);
        assert_eq!(attr.take_update(), Some(&[0.5][..]));
        assert_eq!(attr.take_update(), None);
        assert!(!attr.needs_update());
        // Data survives the upload.
        assert_eq!(attr.as_slice(), &[0.5]);
    }
}
