use crate::config::Features;

pub struct IndexView {
    pub date: String,
    pub features: Features,
    pub is_admin: bool,
}

pub fn render_index(view: &IndexView) -> String {
    let feedback = if view.features.feedback { FEEDBACK_SECTION } else { "" };
    let gallery = if view.features.gallery { GALLERY_SECTION } else { "" };
    let admin_link = if view.is_admin {
        r##"<a href="/admin">Dashboard</a> · <a href="#" id="adminLoginLink" data-admin="true">Admin Logout</a>"##
    } else {
        r##"<a href="#" id="adminLoginLink" data-admin="false">Admin Login</a>"##
    };
    INDEX_HTML
        .replace("{{STYLE}}", STYLE)
        .replace("{{FEEDBACK_SECTION}}", feedback)
        .replace("{{GALLERY_SECTION}}", gallery)
        .replace("{{ADMIN_LINK}}", admin_link)
        .replace("{{DATE}}", &view.date)
        .replace("{{IS_ADMIN}}", if view.is_admin { "true" } else { "false" })
}

pub fn render_admin(date: &str, trend_start: &str, trend_end: &str) -> String {
    ADMIN_HTML
        .replace("{{STYLE}}", STYLE)
        .replace("{{DATE}}", date)
        .replace("{{TREND_START}}", trend_start)
        .replace("{{TREND_END}}", trend_end)
}

const STYLE: &str = r#"
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #f8f3e6;
      --ink: #2b2a28;
      --accent: #f97316;
      --accent-2: #1f2937;
      --card: rgba(255, 255, 255, 0.9);
      --shadow: 0 24px 60px rgba(31, 41, 55, 0.16);
    }

    * { box-sizing: border-box; }

    body {
      margin: 0;
      min-height: 100vh;
      background: linear-gradient(135deg, var(--bg-1), #ffe9d4 60%, #f9f2e9 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(960px, 100%);
      margin: 0 auto;
      display: grid;
      gap: 28px;
    }

    .card {
      background: var(--card);
      border-radius: 24px;
      box-shadow: var(--shadow);
      padding: 28px;
      display: grid;
      gap: 16px;
    }

    h1, h2 { font-family: "Fraunces", "Georgia", serif; margin: 0; }

    .registration-highlight { color: var(--accent); font-weight: 600; }

    form { display: grid; gap: 12px; }

    input, select, textarea, button {
      font: inherit;
      padding: 10px 14px;
      border-radius: 12px;
      border: 1px solid rgba(31, 41, 55, 0.2);
    }

    button {
      background: var(--accent);
      color: white;
      border: none;
      cursor: pointer;
      font-weight: 600;
    }

    button:disabled { opacity: 0.5; cursor: not-allowed; }

    .status { min-height: 1.2em; color: #5f5c57; }

    .gallery-grid {
      display: grid;
      grid-template-columns: repeat(auto-fill, minmax(200px, 1fr));
      gap: 16px;
    }

    .gallery-card img { width: 100%; border-radius: 14px; }

    .charts {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(280px, 1fr));
      gap: 16px;
    }

    .chart { width: 100%; height: auto; }

    .chart-label { font-size: 11px; fill: #5f5c57; }

    .delete-btn { background: red; padding: 5px 10px; font-size: 0.8rem; }

    #debug-log {
      font-family: monospace;
      font-size: 0.8rem;
      max-height: 160px;
      overflow-y: auto;
      background: #111827;
      color: #d1d5db;
      padding: 12px;
      border-radius: 12px;
    }
"#;

const FEEDBACK_SECTION: &str = r#"
    <section class="card" id="feedback">
      <h2>Feedback</h2>
      <form id="feedbackForm">
        <input id="fb-name" placeholder="Your name (optional)" />
        <input id="fb-topic" placeholder="Topic" />
        <select id="fb-rating">
          <option value="5">5 - Loved it</option>
          <option value="4">4</option>
          <option value="3">3</option>
          <option value="2">2</option>
          <option value="1">1</option>
        </select>
        <textarea id="fb-message" rows="3" placeholder="Message"></textarea>
        <button type="submit">Send Feedback</button>
      </form>
    </section>
"#;

const GALLERY_SECTION: &str = r#"
    <section class="card" id="gallery">
      <h2>Gallery</h2>
      <div class="gallery-grid" id="gallery-grid"></div>
    </section>
"#;

const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Thursday Meetup</title>
  <style>{{STYLE}}</style>
</head>
<body>
  <main class="app">
    <section class="card">
      <h1>Thursday Meetup</h1>
      <div id="registration-count">Loading available spots...</div>
    </section>

    <section class="card" id="join">
      <h2>Join the next meetup</h2>
      <form id="joinForm">
        <input id="name" placeholder="Your name" required />
        <select id="table" required></select>
        <input id="date" type="date" value="{{DATE}}" required />
        <button type="submit">Join Event</button>
      </form>
      <div class="status" id="join-status"></div>
    </section>
{{FEEDBACK_SECTION}}{{GALLERY_SECTION}}
    <footer>{{ADMIN_LINK}}</footer>
  </main>

  <script>
    const isAdmin = {{IS_ADMIN}};
    const joinForm = document.getElementById('joinForm');
    const joinStatus = document.getElementById('join-status');
    const submitBtn = joinForm.querySelector('button[type="submit"]');
    const dateInput = document.getElementById('date');
    const tableSelect = document.getElementById('table');

    const escapeHtml = (text) => String(text ?? '').replace(/[&<>"']/g, (c) => (
      { '&': '&amp;', '<': '&lt;', '>': '&gt;', '"': '&quot;', "'": '&#39;' }[c]
    ));

    const loadTicker = async () => {
      const display = document.getElementById('registration-count');
      try {
        const res = await fetch('/api/ticker');
        const view = await res.json();
        if (view.kind === 'rotating') {
          let index = 0;
          const showNext = () => {
            display.innerHTML = `<div class="ticker-item">${escapeHtml(view.lines[index])}</div>`;
            index = (index + 1) % view.lines.length;
          };
          showNext();
          if (view.lines.length > 1) setInterval(showNext, view.interval_secs * 1000);
        } else if (view.kind === 'count') {
          display.innerHTML = `<span class="registration-highlight">${view.count}</span> people registered for ${view.date}`;
        } else {
          display.innerHTML = `<span class="registration-highlight">Registration Open</span> for ${view.date}`;
        }
      } catch (err) {
        display.innerHTML = `<span class="registration-highlight">Registration Open</span> for {{DATE}}`;
      }
    };

    const loadSpots = async () => {
      const res = await fetch('/api/spots');
      const spots = await res.json();
      tableSelect.innerHTML = spots
        .map((spot) => `<option value="${escapeHtml(spot.table)}" ${spot.full ? 'disabled' : ''}>${escapeHtml(spot.option_text)}</option>`)
        .join('');
    };

    const checkRegistrationStatus = async () => {
      const res = await fetch(`/api/registration-status?date=${encodeURIComponent(dateInput.value)}`);
      if (!res.ok) return;
      const status = await res.json();
      submitBtn.disabled = status.registered;
      submitBtn.innerText = status.registered ? 'You are Registered' : 'Join Event';
    };

    joinForm.addEventListener('submit', async (event) => {
      event.preventDefault();
      submitBtn.disabled = true;
      submitBtn.innerText = 'Submitting...';
      const res = await fetch('/api/register', {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify({
          name: document.getElementById('name').value,
          table: tableSelect.value,
          date: dateInput.value,
        }),
      });
      if (res.ok) {
        const confirmation = await res.json();
        joinStatus.textContent = confirmation.message;
      } else {
        joinStatus.textContent = await res.text();
      }
      await checkRegistrationStatus();
    });

    dateInput.addEventListener('change', checkRegistrationStatus);

    const feedbackForm = document.getElementById('feedbackForm');
    if (feedbackForm) {
      feedbackForm.addEventListener('submit', async (event) => {
        event.preventDefault();
        await fetch('/api/feedback', {
          method: 'POST',
          headers: { 'Content-Type': 'application/json' },
          body: JSON.stringify({
            name: document.getElementById('fb-name').value,
            topic: document.getElementById('fb-topic').value,
            rating: document.getElementById('fb-rating').value,
            message: document.getElementById('fb-message').value,
          }),
        });
        alert('Thank you for your feedback!');
        feedbackForm.reset();
      });
    }

    const loadGallery = async () => {
      const grid = document.getElementById('gallery-grid');
      if (!grid) return;
      const res = await fetch('/api/gallery');
      const cards = await res.json();
      grid.innerHTML = cards.map((card) => `
        <div class="gallery-card">
          <img src="${escapeHtml(card.url)}" alt="Meetup Photo" loading="lazy">
          <div>${escapeHtml(card.display_date)}</div>
          <p>${escapeHtml(card.caption)}</p>
          ${isAdmin && card.delete_key ? `<button class="delete-btn" data-key="${escapeHtml(card.delete_key)}">Delete</button>` : ''}
        </div>`).join('');
      grid.querySelectorAll('.delete-btn').forEach((button) => {
        button.addEventListener('click', async () => {
          if (!confirm('Are you sure you want to delete this photo?')) return;
          const res = await fetch('/api/gallery/delete', {
            method: 'POST',
            headers: { 'Content-Type': 'application/json' },
            body: JSON.stringify({ key: button.dataset.key }),
          });
          if (res.ok) location.reload(); else alert('Failed to delete');
        });
      });
    };

    document.getElementById('adminLoginLink').addEventListener('click', async (event) => {
      event.preventDefault();
      if (isAdmin) {
        await fetch('/api/admin/logout', { method: 'POST' });
        location.reload();
        return;
      }
      const password = prompt('Admin password');
      if (!password) return;
      const res = await fetch('/api/admin/login', {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify({ password }),
      });
      if (res.ok) location.reload(); else alert('Incorrect password');
    });

    loadTicker();
    loadSpots().then(checkRegistrationStatus);
    loadGallery();
  </script>
</body>
</html>
"##;

const ADMIN_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Meetup Admin</title>
  <style>{{STYLE}}</style>
</head>
<body>
  <main class="app">
    <section class="card">
      <h1>Admin Dashboard</h1>
      <form id="dateForm">
        <input id="adminDate" type="date" value="{{DATE}}" />
        <button type="button" id="refreshAdminBtn">Refresh</button>
        <button type="button" id="testChartBtn">Run Diagnostic</button>
        <button type="button" id="logoutBtn">Logout</button>
      </form>
      <div class="charts">
        <div id="tableChart"></div>
        <div id="newReturningChart"></div>
        <div id="languageChart"></div>
      </div>
    </section>

    <section class="card">
      <h2>Weekly Trend</h2>
      <form id="trendForm">
        <input id="trendStart" type="date" value="{{TREND_START}}" />
        <input id="trendEnd" type="date" value="{{TREND_END}}" />
        <button type="button" id="loadTrendBtn">Load Trend</button>
      </form>
      <div id="trendChart"></div>
    </section>

    <section class="card">
      <h2>Upload Photo</h2>
      <form id="uploadForm">
        <input id="photoFile" type="file" accept="image/*" required />
        <input id="photoDate" type="date" value="{{DATE}}" required />
        <button type="submit">Upload</button>
      </form>
      <div class="status" id="uploadStatus"></div>
    </section>

    <div id="debug-log"></div>
  </main>

  <script>
    const log = (message) => {
      const el = document.getElementById('debug-log');
      el.innerHTML += `[${new Date().toLocaleTimeString()}] ${message}<br>`;
      el.scrollTop = el.scrollHeight;
    };

    const fetchAdminData = async (date) => {
      log(`Fetching data for ${date}...`);
      const res = await fetch(`/api/admin/summary?date=${encodeURIComponent(date)}`);
      if (!res.ok) {
        log(`Fetch Error: ${await res.text()}`);
        return;
      }
      const summary = await res.json();
      log(`Data received. Count: ${summary.aggregation.total}`);
      document.getElementById('tableChart').innerHTML = summary.charts.tables.svg;
      document.getElementById('newReturningChart').innerHTML = summary.charts.new_vs_returning.svg;
      document.getElementById('languageChart').innerHTML = summary.charts.languages.svg;
    };

    const fetchTrendRange = async () => {
      const start = document.getElementById('trendStart').value;
      const end = document.getElementById('trendEnd').value;
      if (!start || !end) return;
      log(`Fetching trend data from ${start} to ${end}...`);
      const res = await fetch(`/api/admin/trend?start=${start}&end=${end}`);
      if (!res.ok) {
        log(`Error fetching trend range: ${await res.text()}`);
        return;
      }
      const trend = await res.json();
      log(`Trend data loaded. Points: ${trend.points.length}`);
      document.getElementById('trendChart').innerHTML = trend.chart.svg;
    };

    const fileToBase64 = (file) => new Promise((resolve, reject) => {
      const reader = new FileReader();
      reader.onload = () => resolve(reader.result);
      reader.onerror = reject;
      reader.readAsDataURL(file);
    });

    const dateInput = document.getElementById('adminDate');
    dateInput.addEventListener('change', () => fetchAdminData(dateInput.value));
    document.getElementById('refreshAdminBtn').addEventListener('click', () => fetchAdminData(dateInput.value));
    document.getElementById('loadTrendBtn').addEventListener('click', fetchTrendRange);

    document.getElementById('testChartBtn').addEventListener('click', async () => {
      log('--- STARTING DIAGNOSTIC TEST ---');
      const res = await fetch('/api/admin/diagnostic');
      const result = await res.json();
      document.getElementById('tableChart').innerHTML = result.chart.svg;
      log(result.message);
    });

    document.getElementById('logoutBtn').addEventListener('click', async () => {
      await fetch('/api/admin/logout', { method: 'POST' });
      window.location.href = '/';
    });

    document.getElementById('uploadForm').addEventListener('submit', async (event) => {
      event.preventDefault();
      const status = document.getElementById('uploadStatus');
      const file = document.getElementById('photoFile').files[0];
      if (!file) return;
      status.textContent = 'Compressing & Uploading...';
      const image = await fileToBase64(file);
      const res = await fetch('/api/gallery/upload', {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify({ image, date: document.getElementById('photoDate').value }),
      });
      status.textContent = res.ok ? 'Done!' : `Error: ${await res.text()}`;
    });

    fetchAdminData(dateInput.value);
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_omits_disabled_sections() {
        let view = IndexView {
            date: "2024-01-04".to_string(),
            features: Features {
                feedback: false,
                gallery: true,
            },
            is_admin: false,
        };
        let html = render_index(&view);
        assert!(!html.contains("id=\"feedbackForm\""));
        assert!(html.contains("gallery-grid"));
        assert!(html.contains("value=\"2024-01-04\""));
        assert!(html.contains("Admin Login"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn admin_page_prefills_ranges() {
        let html = render_admin("2024-01-04", "2023-10-12", "2024-02-01");
        assert!(html.contains("value=\"2023-10-12\""));
        assert!(html.contains("value=\"2024-02-01\""));
        assert!(!html.contains("{{"));
    }
}
