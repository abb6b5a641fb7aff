//! In-memory surface and job sink for coordinator tests

use std::path::PathBuf;

use anyhow::{bail, Result};

use super::jobs::Jobs;
use super::menu::MenuModel;
use crate::animation::Frame;
use crate::border::BorderPaint;
use crate::platform::{ResizeHighlight, Surface};
use crate::shared::WidgetGeometry;

#[derive(Debug, Default)]
pub struct FakeSurface {
    pub visible: bool,
    pub geometry: Option<WidgetGeometry>,
    pub frames: Vec<Frame>,
    /// Number of upcoming `present_frame` calls that fail
    pub fail_frames: usize,
    pub borders: Vec<Option<BorderPaint>>,
    pub highlight: Option<ResizeHighlight>,
    pub menus: Vec<(MenuModel, i32, i32)>,
    pub menu_open: bool,
    /// Number of upcoming `set_visible` calls that fail
    pub fail_visibility: usize,
    pub visibility_log: Vec<bool>,
}

impl FakeSurface {
    pub fn last_border(&self) -> Option<BorderPaint> {
        self.borders.last().copied().flatten()
    }
}

impl Surface for FakeSurface {
    fn set_geometry(&mut self, geometry: WidgetGeometry) -> Result<()> {
        self.geometry = Some(geometry);
        Ok(())
    }

    fn set_visible(&mut self, visible: bool) -> Result<()> {
        if self.fail_visibility > 0 {
            self.fail_visibility -= 1;
            bail!("map request failed");
        }
        self.visible = visible;
        self.visibility_log.push(visible);
        Ok(())
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn present_frame(&mut self, frame: &Frame) -> Result<()> {
        if self.fail_frames > 0 {
            self.fail_frames -= 1;
            bail!("put image failed");
        }
        self.frames.push(frame.clone());
        Ok(())
    }

    fn paint_border(&mut self, border: Option<BorderPaint>) -> Result<()> {
        self.borders.push(border);
        Ok(())
    }

    fn set_resize_highlight(&mut self, highlight: Option<ResizeHighlight>) -> Result<()> {
        self.highlight = highlight;
        Ok(())
    }

    fn show_menu(&mut self, menu: &MenuModel, x: i32, y: i32) -> Result<()> {
        self.menus.push((menu.clone(), x, y));
        self.menu_open = true;
        Ok(())
    }

    fn close_menu(&mut self) -> Result<()> {
        self.menu_open = false;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    Decode { generation: u64, path: PathBuf, width: u32, height: u32 },
    Pick,
    Sample,
}

#[derive(Debug, Default)]
pub struct FakeJobs {
    pub jobs: Vec<Job>,
}

impl FakeJobs {
    pub fn count(&self, job: &Job) -> usize {
        self.jobs.iter().filter(|j| *j == job).count()
    }
}

impl Jobs for FakeJobs {
    fn decode_source(&mut self, generation: u64, path: PathBuf, width: u32, height: u32) {
        self.jobs.push(Job::Decode { generation, path, width, height });
    }

    fn pick_source(&mut self) {
        self.jobs.push(Job::Pick);
    }

    fn request_sample(&mut self) {
        self.jobs.push(Job::Sample);
    }
}
