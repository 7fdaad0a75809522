//! The particle field: a fixed set of glyph particles, their proximity
//! links, and the stimuli that push them around.
//!
//! A [`Field`] is the single owner of all particle state. The host calls
//! [`Field::update`] (or [`Field::advance`]) and [`Field::render`] once per
//! frame, and forwards pointer moves to [`Field::repel`] and viewport changes
//! to [`Field::resize`] whenever they arrive.
//!
//! ```ignore
//! use glyphfield::prelude::*;
//!
//! let mut field = Field::new(1280.0, 720.0);
//! let mut canvas = Canvas::new(1280, 720);
//!
//! field.repel(Vec2::new(640.0, 360.0));
//! field.update();
//! let stats = field.render(&mut canvas);
//! println!("{} links", stats.links_drawn);
//! ```

use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::particle::Particle;
use crate::spatial::{SpatialConfig, SpatialGrid};
use crate::surface::{RadialGradient, Rect, Rgba, Surface};

/// Particles spawned when no count is configured.
pub const DEFAULT_PARTICLE_COUNT: usize = 50;
/// Links are drawn between particles closer than this.
pub const LINK_DISTANCE: f32 = 150.0;
/// Link alpha for coincident particles.
pub const LINK_MAX_ALPHA: f32 = 0.3;
pub const LINK_COLOR: Rgba = Rgba::from_hex(0x00ffff);
pub const LINK_WIDTH: f32 = 1.0;
/// Pointer influence radius.
pub const REPEL_RADIUS: f32 = 100.0;
/// Impulse scale at zero distance.
pub const REPEL_STRENGTH: f32 = 0.5;
/// Alpha byte at the centre of a particle's glow.
pub const GLOW_ALPHA: u8 = 0x40;
/// Largest per-update step multiplier in time-scaled mode, in frames.
pub const MAX_STEP_SCALE: f32 = 4.0;

/// How particle motion relates to wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    /// One velocity step per rendered frame, whatever the refresh rate.
    FrameLocked,
    /// Steps scaled by elapsed seconds times `reference_hz`.
    TimeScaled { reference_hz: f32 },
}

/// How candidate pairs are found for the link pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LinkStrategy {
    /// Test every unordered pair: `N * (N - 1) / 2` checks.
    Exhaustive,
    /// Test only pairs in the same or adjacent grid cells.
    Grid,
    /// Exhaustive up to `threshold` particles, grid above it.
    Auto { threshold: usize },
}

/// Field parameters. The defaults reproduce the original effect.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldConfig {
    pub particle_count: usize,
    pub link_distance: f32,
    pub link_max_alpha: f32,
    pub link_color: Rgba,
    pub repel_radius: f32,
    pub repel_strength: f32,
    /// Speed cap applied after each repulsion impulse. `None` leaves
    /// velocity unbounded.
    pub max_speed: Option<f32>,
    pub motion: Motion,
    pub links: LinkStrategy,
    /// Seed for spawning and per-frame number rolls. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            particle_count: DEFAULT_PARTICLE_COUNT,
            link_distance: LINK_DISTANCE,
            link_max_alpha: LINK_MAX_ALPHA,
            link_color: LINK_COLOR,
            repel_radius: REPEL_RADIUS,
            repel_strength: REPEL_STRENGTH,
            max_speed: None,
            motion: Motion::FrameLocked,
            links: LinkStrategy::Exhaustive,
            seed: None,
        }
    }
}

impl FieldConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_particle_count(mut self, count: usize) -> Self {
        self.particle_count = count;
        self
    }

    pub fn with_link_distance(mut self, distance: f32) -> Self {
        self.link_distance = distance;
        self
    }

    pub fn with_link_color(mut self, color: Rgba) -> Self {
        self.link_color = color;
        self
    }

    pub fn with_repel(mut self, radius: f32, strength: f32) -> Self {
        self.repel_radius = radius;
        self.repel_strength = strength;
        self
    }

    /// Cap particle speed after pointer impulses.
    pub fn with_max_speed(mut self, max_speed: f32) -> Self {
        self.max_speed = Some(max_speed);
        self
    }

    pub fn with_motion(mut self, motion: Motion) -> Self {
        self.motion = motion;
        self
    }

    pub fn with_links(mut self, links: LinkStrategy) -> Self {
        self.links = links;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Alpha of a link between particles `distance` apart.
///
/// Fades linearly from `max_alpha` at zero to 0 at `link_distance`.
pub fn link_alpha(distance: f32, link_distance: f32, max_alpha: f32) -> f32 {
    if link_distance <= 0.0 {
        return 0.0;
    }
    ((link_distance - distance) / link_distance * max_alpha).max(0.0)
}

/// One proximity link found by the link pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    pub a: usize,
    pub b: usize,
    pub from: Vec2,
    pub to: Vec2,
    pub distance: f32,
    pub alpha: f32,
}

/// Work done by one [`Field::render`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub pairs_checked: usize,
    pub links_drawn: usize,
    pub particles_drawn: usize,
}

/// Owner of all particle state.
#[derive(Debug)]
pub struct Field {
    particles: Vec<Particle>,
    bounds: Vec2,
    config: FieldConfig,
    rng: StdRng,
    grid: SpatialGrid,
    pointer: Option<Vec2>,
}

impl Field {
    /// Field of default size and parameters over a `width` x `height` surface.
    pub fn new(width: f32, height: f32) -> Self {
        Self::with_config(width, height, FieldConfig::default())
    }

    /// Spawn `config.particle_count` particles inside the bounds.
    pub fn with_config(width: f32, height: f32, config: FieldConfig) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let bounds = Vec2::new(width, height);
        let particles = (0..config.particle_count)
            .map(|_| Particle::spawn(&mut rng, bounds))
            .collect();

        log::debug!(
            "spawned {} particles in {}x{}",
            config.particle_count,
            width,
            height
        );
        Self::assemble(particles, bounds, config, rng)
    }

    /// Field over explicit particles. `config.particle_count` is ignored.
    pub fn from_particles(width: f32, height: f32, particles: Vec<Particle>, mut config: FieldConfig) -> Self {
        config.particle_count = particles.len();
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::assemble(particles, Vec2::new(width, height), config, rng)
    }

    fn assemble(particles: Vec<Particle>, bounds: Vec2, config: FieldConfig, rng: StdRng) -> Self {
        let grid = SpatialGrid::new(SpatialConfig::new(config.link_distance.max(1.0)));
        Self {
            particles,
            bounds,
            config,
            rng,
            grid,
            pointer: None,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Current `(width, height)`.
    pub fn bounds(&self) -> Vec2 {
        self.bounds
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    /// Last pointer position passed to [`Field::repel`].
    pub fn pointer(&self) -> Option<Vec2> {
        self.pointer
    }

    /// Advance every particle by one frame.
    pub fn update(&mut self) {
        self.step(1.0);
    }

    /// Advance by `dt` seconds according to the configured [`Motion`].
    ///
    /// In `FrameLocked` mode `dt` is ignored and this is [`Field::update`].
    pub fn advance(&mut self, dt: f32) {
        match self.config.motion {
            Motion::FrameLocked => self.step(1.0),
            Motion::TimeScaled { reference_hz } => {
                let scale = dt * reference_hz;
                if scale.is_finite() && scale > 0.0 {
                    self.step(scale.min(MAX_STEP_SCALE));
                }
            }
        }
    }

    fn step(&mut self, scale: f32) {
        let bounds = self.bounds;
        for p in &mut self.particles {
            p.update(bounds, scale);
        }
    }

    /// Update the surface bounds.
    ///
    /// Particles are not moved here; they are clamped into the new bounds on
    /// the next update.
    pub fn resize(&mut self, width: f32, height: f32) {
        log::debug!("field resized to {}x{}", width, height);
        self.bounds = Vec2::new(width, height);
    }

    /// Push particles near `pointer` away from it.
    ///
    /// Each particle closer than the repel radius gains
    /// `(delta / d) * ((radius - d) / radius) * strength`, where `delta`
    /// points from the pointer to the particle. A particle sitting exactly on
    /// the pointer has no direction and is left alone. Returns the number of
    /// particles pushed.
    pub fn repel(&mut self, pointer: Vec2) -> usize {
        self.pointer = Some(pointer);
        let radius = self.config.repel_radius;
        let strength = self.config.repel_strength;
        if radius <= 0.0 || !pointer.is_finite() {
            return 0;
        }

        let mut pushed = 0;
        for p in &mut self.particles {
            let delta = p.position - pointer;
            let distance = delta.length();
            if distance >= radius || distance < f32::EPSILON {
                continue;
            }
            let force = (radius - distance) / radius;
            p.velocity += delta / distance * force * strength;
            if let Some(max) = self.config.max_speed {
                p.velocity = p.velocity.clamp_length_max(max);
            }
            pushed += 1;
        }
        pushed
    }

    fn uses_grid(&self) -> bool {
        match self.config.links {
            LinkStrategy::Exhaustive => false,
            LinkStrategy::Grid => true,
            LinkStrategy::Auto { threshold } => self.particles.len() > threshold,
        }
    }

    /// Visit every link under the configured strategy.
    ///
    /// Returns the number of pairs whose distance was tested.
    pub fn for_each_link(&mut self, mut visit: impl FnMut(Link)) -> usize {
        let link_distance = self.config.link_distance;
        let max_alpha = self.config.link_max_alpha;
        let particles = &self.particles;

        let mut test = |a: usize, b: usize| {
            let from = particles[a].position;
            let to = particles[b].position;
            let distance = from.distance(to);
            if distance < link_distance {
                visit(Link {
                    a,
                    b,
                    from,
                    to,
                    distance,
                    alpha: link_alpha(distance, link_distance, max_alpha),
                });
            }
        };

        if self.uses_grid() {
            self.grid
                .rebuild(particles.iter().map(|p| p.position), self.bounds);
            self.grid.for_each_candidate_pair(test)
        } else {
            let n = particles.len();
            for i in 0..n {
                for j in (i + 1)..n {
                    test(i, j);
                }
            }
            n * n.saturating_sub(1) / 2
        }
    }

    /// Collect this frame's links.
    pub fn links(&mut self) -> Vec<Link> {
        let mut out = Vec::new();
        self.for_each_link(|link| out.push(link));
        out
    }

    /// Draw one frame: clear, links, then each particle's glow and glyph.
    pub fn render<S: Surface + ?Sized>(&mut self, surface: &mut S) -> FrameStats {
        surface.clear();

        let color = self.config.link_color;
        let mut links_drawn = 0;
        let pairs_checked = self.for_each_link(|link| {
            surface.save();
            surface.set_alpha(link.alpha);
            surface.stroke_line(link.from, link.to, color, LINK_WIDTH);
            surface.restore();
            links_drawn += 1;
        });

        let Field { particles, rng, .. } = self;
        for p in particles.iter() {
            let symbol = p.symbol();
            let radius = p.radius();

            surface.save();
            surface.set_alpha(p.alpha());
            surface.translate(p.position);
            surface.rotate(p.rotation.to_radians());

            let glow = RadialGradient {
                center: Vec2::ZERO,
                radius,
                inner: symbol.color.with_alpha(GLOW_ALPHA),
                outer: symbol.color.with_alpha(0),
            };
            surface.fill_radial_gradient_rect(Rect::centered(Vec2::ZERO, radius), &glow);

            let text = symbol.text(rng).to_string();
            surface.fill_text(&text, Vec2::ZERO, radius, symbol.color);
            surface.restore();
        }

        FrameStats {
            pairs_checked,
            links_drawn,
            particles_drawn: particles.len(),
        }
    }
}
