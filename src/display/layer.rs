/*
 *  display/layer.rs
 *
 *  sparkface - spark watchface
 *  (c) 2020-26 Stuart Hunter
 *
 *  Window and the layers stacked on it
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_text::alignment::{HorizontalAlignment, VerticalAlignment};
use embedded_text::{TextBox, style::TextBoxStyleBuilder};

use super::color::Color;
use crate::host::resources::{Bitmap, FontHandle};

/// Which layer sits in a window slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerId {
    Background,
    Weather,
    Time,
}

/// Root of the screen: a fill color and the layers drawn over it, bottom first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    background: Color,
    children: Vec<LayerId>,
}

impl Window {
    pub fn new(background: Color) -> Self {
        Self { background, children: Vec::new() }
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn set_background(&mut self, color: Color) {
        self.background = color;
    }

    /// Stack a layer on top. A layer already attached is left where it is.
    pub fn add_child(&mut self, id: LayerId) {
        if !self.children.contains(&id) {
            self.children.push(id);
        }
    }

    pub fn remove_all_children(&mut self) {
        self.children.clear();
    }

    pub fn children(&self) -> &[LayerId] {
        &self.children
    }

    pub fn draw<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        match self.background.to_binary() {
            Some(fill) => target.clear(fill),
            None => Ok(()),
        }
    }
}

/// Single run of text in a fixed frame
#[derive(Debug, Clone)]
pub struct TextLayer {
    frame: Rectangle,
    text: String,
    font: FontHandle,
    text_color: Color,
    background: Color,
    alignment: HorizontalAlignment,
}

impl TextLayer {
    pub fn new(frame: Rectangle, font: FontHandle) -> Self {
        Self {
            frame,
            text: String::new(),
            font,
            text_color: Color::Black,
            background: Color::Clear,
            alignment: HorizontalAlignment::Left,
        }
    }

    pub fn with_alignment(mut self, alignment: HorizontalAlignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn frame(&self) -> Rectangle {
        self.frame
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: &str) {
        self.text.clear();
        self.text.push_str(text);
    }

    pub fn font(&self) -> FontHandle {
        self.font
    }

    pub fn text_color(&self) -> Color {
        self.text_color
    }

    pub fn set_text_color(&mut self, color: Color) {
        self.text_color = color;
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn set_background(&mut self, color: Color) {
        self.background = color;
    }

    pub fn alignment(&self) -> HorizontalAlignment {
        self.alignment
    }

    pub fn draw<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        if let Some(fill) = self.background.to_binary() {
            self.frame
                .into_styled(PrimitiveStyle::with_fill(fill))
                .draw(target)?;
        }

        let Some(ink) = self.text_color.to_binary() else {
            return Ok(());
        };
        if self.text.is_empty() {
            return Ok(());
        }

        let character_style = MonoTextStyle::new(self.font.font(), ink);
        let textbox_style = TextBoxStyleBuilder::new()
            .alignment(self.alignment)
            .vertical_alignment(VerticalAlignment::Top)
            .build();
        TextBox::with_textbox_style(&self.text, self.frame, character_style, textbox_style)
            .draw(target)?;
        Ok(())
    }
}

/// Full-frame image; pixels outside the frame are not drawn
#[derive(Debug)]
pub struct BitmapLayer {
    frame: Rectangle,
    bitmap: Bitmap,
}

impl BitmapLayer {
    pub fn new(frame: Rectangle, bitmap: Bitmap) -> Self {
        Self { frame, bitmap }
    }

    pub fn frame(&self) -> Rectangle {
        self.frame
    }

    pub fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    /// Give the bitmap back so it can be released
    pub fn into_bitmap(self) -> Bitmap {
        self.bitmap
    }

    pub fn draw<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        let frame = self.frame;
        target.draw_iter(
            self.bitmap
                .pixels_at(frame.top_left)
                .filter(move |Pixel(p, _)| frame.contains(*p)),
        )
    }
}
