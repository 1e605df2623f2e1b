//! Ordered set of objects on the canvas.
//!
//! Order is paint order: later objects draw over earlier ones.

use crate::model::{DrawableObject, Shape, StrokeStyle};

/// The live scene; sole owner of the objects on the canvas.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    objects: Vec<DrawableObject>,
    next_id: u64,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            next_id: 1,
        }
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        id
    }

    /// Adds a user shape on top and returns its id.
    pub fn add(&mut self, shape: Shape, stroke: StrokeStyle) -> u64 {
        let id = self.allocate_id();
        self.objects.push(DrawableObject::new(id, shape, stroke));
        id
    }

    /// Adds an object with the given tags on top and returns its id.
    pub fn add_tagged<I, S>(&mut self, shape: Shape, stroke: StrokeStyle, tags: I) -> u64
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let id = self.allocate_id();
        self.objects
            .push(DrawableObject::with_tags(id, shape, stroke, tags));
        id
    }

    /// Adds a rebuilt object, keeping its id unless that id is already taken.
    pub fn insert(&mut self, mut object: DrawableObject) -> u64 {
        if object.id == 0 || self.get(object.id).is_some() {
            object.id = self.allocate_id();
        } else if object.id >= self.next_id {
            self.next_id = object.id + 1;
        }
        let id = object.id;
        self.objects.push(object);
        id
    }

    pub fn remove(&mut self, id: u64) -> Option<DrawableObject> {
        let index = self.objects.iter().position(|o| o.id == id)?;
        Some(self.objects.remove(index))
    }

    pub fn get(&self, id: u64) -> Option<&DrawableObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn get_mut(&mut self, id: u64) -> Option<&mut DrawableObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    /// All objects in paint order
    pub fn objects(&self) -> &[DrawableObject] {
        &self.objects
    }

    /// Objects that belong in history, in paint order
    pub fn durable_objects(&self) -> impl Iterator<Item = &DrawableObject> {
        self.objects.iter().filter(|o| o.is_durable())
    }

    pub fn objects_with_tag<'a>(
        &'a self,
        tag: &'a str,
    ) -> impl Iterator<Item = &'a DrawableObject> + 'a {
        self.objects.iter().filter(move |o| o.has_tag(tag))
    }

    /// Removes every durable object, leaving overlays in place.
    ///
    /// Returns the number removed.
    pub fn clear_durable(&mut self) -> usize {
        let before = self.objects.len();
        self.objects.retain(|o| !o.is_durable());
        before - self.objects.len()
    }

    /// Removes every object carrying `tag`; returns the number removed.
    pub fn remove_tagged(&mut self, tag: &str) -> usize {
        let before = self.objects.len();
        self.objects.retain(|o| !o.has_tag(tag));
        before - self.objects.len()
    }

    /// Scales every durable object's geometry and stroke width by `factor`.
    pub fn scale_durable(&mut self, factor: f64) {
        for object in self.objects.iter_mut().filter(|o| o.is_durable()) {
            *object = object.scaled(factor);
        }
    }

    /// Moves objects carrying `tag` to the top, keeping their relative order.
    pub fn raise(&mut self, tag: &str) {
        let (tagged, rest): (Vec<_>, Vec<_>) =
            self.objects.drain(..).partition(|o| o.has_tag(tag));
        self.objects = rest;
        self.objects.extend(tagged);
    }

    /// Moves objects carrying `tag` to the bottom, keeping their relative order.
    pub fn lower(&mut self, tag: &str) {
        let (mut tagged, rest): (Vec<_>, Vec<_>) =
            self.objects.drain(..).partition(|o| o.has_tag(tag));
        tagged.extend(rest);
        self.objects = tagged;
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
