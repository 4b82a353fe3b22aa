use crate::models::SessionState;

pub fn render_index(state: &SessionState) -> String {
    let initial = serde_json::to_string(state)
        .unwrap_or_else(|_| "null".to_string())
        .replace("</", "<\\/");
    INDEX_HTML.replace("{{STATE}}", &initial)
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Attendance Dashboard</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #0f172a;
      --bg-2: #1e293b;
      --ink: #e2e8f0;
      --muted: #94a3b8;
      --card: rgba(30, 41, 59, 0.86);
      --safe: #34d399;
      --caution: #fbbf24;
      --danger: #f87171;
      --accent: #6366f1;
      --shadow: 0 24px 60px rgba(2, 6, 23, 0.45);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #111827 60%, #0b1120 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(860px, 100%);
      background: var(--card);
      backdrop-filter: blur(12px);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 28px;
    }

    .hidden {
      display: none !important;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-weight: 600;
      font-size: clamp(2rem, 4vw, 2.6rem);
      margin: 0;
    }

    .subtitle {
      margin: 0;
      color: var(--muted);
    }

    form {
      display: grid;
      gap: 14px;
    }

    label {
      display: grid;
      gap: 6px;
      font-size: 0.85rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: var(--muted);
    }

    input {
      border-radius: 14px;
      border: 1px solid rgba(148, 163, 184, 0.3);
      background: rgba(15, 23, 42, 0.6);
      color: var(--ink);
      padding: 14px 16px;
      font-size: 1rem;
    }

    .password-row {
      display: flex;
      gap: 8px;
    }

    .password-row input {
      flex: 1;
    }

    button {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 14px 20px;
      font-size: 1rem;
      font-weight: 600;
      cursor: pointer;
      background: var(--accent);
      color: white;
    }

    button.ghost {
      background: rgba(148, 163, 184, 0.16);
      color: var(--ink);
    }

    button:disabled {
      opacity: 0.5;
      cursor: progress;
    }

    .error {
      color: var(--danger);
      min-height: 1.2em;
    }

    .progress-track {
      height: 10px;
      border-radius: 999px;
      background: rgba(148, 163, 184, 0.2);
      overflow: hidden;
    }

    .progress-fill {
      height: 100%;
      width: 10%;
      background: var(--accent);
      transition: width 600ms ease;
    }

    .profile {
      display: flex;
      flex-wrap: wrap;
      justify-content: space-between;
      align-items: center;
      gap: 16px;
    }

    .actions {
      display: flex;
      gap: 10px;
    }

    .aggregate {
      text-align: center;
      display: grid;
      gap: 8px;
    }

    .aggregate .value {
      font-size: clamp(3rem, 8vw, 4.5rem);
      font-weight: 700;
    }

    .status-text {
      font-size: 0.8rem;
      font-weight: 700;
      text-transform: uppercase;
      letter-spacing: 0.2em;
    }

    .safe { color: var(--safe); }
    .caution { color: var(--caution); }
    .danger, .warning { color: var(--danger); }

    .courses {
      display: grid;
      gap: 12px;
    }

    .course {
      display: flex;
      justify-content: space-between;
      align-items: center;
      gap: 16px;
      padding: 16px 18px;
      border-radius: 18px;
      background: rgba(15, 23, 42, 0.5);
      border-left: 4px solid var(--safe);
    }

    .course.caution { border-left-color: var(--caution); }
    .course.danger { border-left-color: var(--danger); }

    .course h4 {
      margin: 0 0 4px;
      color: var(--ink);
    }

    .course .counts {
      font-size: 0.8rem;
      color: var(--muted);
      text-transform: uppercase;
      letter-spacing: 0.08em;
    }

    .course .pct {
      font-size: 1.6rem;
      font-weight: 700;
    }

    .placeholder {
      text-align: center;
      color: var(--muted);
      padding: 40px 0;
    }

    .hint {
      margin: 0;
      color: var(--muted);
      font-size: 0.85rem;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Attendance Dashboard</h1>
      <p class="subtitle">Sign in with your portal credentials to see attendance per course.</p>
    </header>

    <section id="login-section">
      <form id="login-form" method="post" action="/login">
        <label>Register number
          <input id="username" name="username" autocomplete="username" required />
        </label>
        <label>Password
          <span class="password-row">
            <input id="password" name="password" type="password" autocomplete="current-password" required />
            <button class="ghost" id="toggle-password" type="button">Show</button>
          </span>
        </label>
        <button id="login-btn" type="submit">Fetch attendance</button>
      </form>
      <p id="error-message" class="error"></p>
    </section>

    <section id="loading-section" class="hidden">
      <p id="progress-text">Connecting to attendance portal...</p>
      <div class="progress-track"><div id="progress-fill" class="progress-fill"></div></div>
    </section>

    <section id="dashboard-section" class="hidden">
      <div class="profile">
        <div>
          <h2 id="display-name"></h2>
          <p id="display-id" class="subtitle"></p>
        </div>
        <div class="actions">
          <form method="post" action="/refresh" id="refresh-form">
            <button class="ghost" id="refresh-btn" type="submit">Refresh</button>
          </form>
          <form method="post" action="/logout" id="logout-form">
            <button class="ghost" id="logout-btn" type="submit">Logout</button>
          </form>
        </div>
      </div>

      <div class="aggregate">
        <span class="subtitle">Aggregate percentage</span>
        <span id="overall-percentage" class="value">0%</span>
        <span id="status-text" class="status-text"></span>
        <span class="subtitle">Classes attended: <b id="total-attended">0</b> / <span id="total-conducted">0</span></span>
      </div>

      <div id="course-list" class="courses"></div>
      <p id="fetched-at" class="hint"></p>
    </section>
  </main>

  <script>
    const loginSection = document.getElementById('login-section');
    const loadingSection = document.getElementById('loading-section');
    const dashboardSection = document.getElementById('dashboard-section');
    const loginForm = document.getElementById('login-form');
    const loginBtn = document.getElementById('login-btn');
    const errorMsg = document.getElementById('error-message');
    const progressFill = document.getElementById('progress-fill');
    const progressText = document.getElementById('progress-text');
    const displayName = document.getElementById('display-name');
    const displayId = document.getElementById('display-id');
    const overallPercentage = document.getElementById('overall-percentage');
    const statusText = document.getElementById('status-text');
    const totalAttendedEl = document.getElementById('total-attended');
    const totalConductedEl = document.getElementById('total-conducted');
    const courseList = document.getElementById('course-list');
    const fetchedAt = document.getElementById('fetched-at');
    const refreshForm = document.getElementById('refresh-form');
    const logoutForm = document.getElementById('logout-form');
    const passwordInput = document.getElementById('password');
    const togglePassword = document.getElementById('toggle-password');

    let current = {{STATE}};
    let pollTimer = null;

    const show = (section) => {
      [loginSection, loadingSection, dashboardSection].forEach((el) => {
        el.classList.toggle('hidden', el !== section);
      });
    };

    const renderCourses = (summary) => {
      courseList.replaceChildren();
      if (summary.no_data) {
        const empty = document.createElement('p');
        empty.className = 'placeholder';
        empty.textContent = 'No attendance data found.';
        courseList.appendChild(empty);
        return;
      }
      summary.per_course.forEach((row) => {
        const item = document.createElement('div');
        item.className = `course ${row.risk_tier}`;

        const info = document.createElement('div');
        const title = document.createElement('h4');
        title.textContent = row.code;
        const counts = document.createElement('div');
        counts.className = 'counts';
        counts.textContent = `Attended: ${row.attended} · Conducted: ${row.total}`;
        info.append(title, counts);

        const pct = document.createElement('div');
        pct.className = `pct ${row.risk_tier}`;
        pct.textContent = `${row.percentage}%`;

        item.append(info, pct);
        courseList.appendChild(item);
      });
    };

    const render = (state) => {
      if (!state) {
        return;
      }
      current = state;
      loginBtn.disabled = state.phase === 'attempting';
      refreshForm.classList.toggle('hidden', !state.resumable);

      if (state.phase === 'attempting') {
        show(loadingSection);
        progressFill.style.width = `${state.progress.percent}%`;
        progressText.textContent = state.progress.label;
        schedulePoll();
        return;
      }

      if (state.phase === 'dashboard') {
        show(dashboardSection);
        displayName.textContent = state.student_name || '';
        displayId.textContent = state.username;
        const summary = state.summary;
        overallPercentage.textContent = `${summary.overall_percentage.toFixed(2)}%`;
        overallPercentage.className = `value ${summary.overall_tier}`;
        statusText.textContent = summary.overall_tier === 'safe' ? 'Safe Zone' : 'Shortage Warning';
        statusText.className = `status-text ${summary.overall_tier}`;
        totalAttendedEl.textContent = summary.total_attended;
        totalConductedEl.textContent = summary.total_conducted;
        fetchedAt.textContent = `Last updated ${state.fetched_at}`;
        renderCourses(summary);
        return;
      }

      show(loginSection);
      errorMsg.textContent = state.phase === 'login_error' ? state.message : '';
      if (state.phase === 'logged_out') {
        passwordInput.value = '';
      }
    };

    const schedulePoll = () => {
      if (pollTimer) {
        return;
      }
      pollTimer = setTimeout(async () => {
        pollTimer = null;
        try {
          const res = await fetch('/api/session');
          render(await res.json());
        } catch (err) {
          errorMsg.textContent = err.message;
          schedulePoll();
        }
      }, 500);
    };

    const post = async (url, body) => {
      const res = await fetch(url, {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: body ? JSON.stringify(body) : undefined
      });
      const payload = await res.json();
      if (!res.ok) {
        throw new Error(payload.error || 'Request failed');
      }
      return payload;
    };

    loginForm.addEventListener('submit', (event) => {
      event.preventDefault();
      const username = document.getElementById('username').value;
      post('/api/login', { username, password: passwordInput.value })
        .then(render)
        .catch((err) => { errorMsg.textContent = err.message; });
    });

    refreshForm.addEventListener('submit', (event) => {
      event.preventDefault();
      post('/api/refresh')
        .then(render)
        .catch((err) => { errorMsg.textContent = err.message; });
    });

    logoutForm.addEventListener('submit', (event) => {
      event.preventDefault();
      post('/api/logout')
        .then(render)
        .catch((err) => { errorMsg.textContent = err.message; });
    });

    togglePassword.addEventListener('click', () => {
      const reveal = passwordInput.getAttribute('type') === 'password';
      passwordInput.setAttribute('type', reveal ? 'text' : 'password');
      togglePassword.textContent = reveal ? 'Hide' : 'Show';
    });

    render(current);
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FailureKind, SessionPhase};

    #[test]
    fn embeds_state_json() {
        let html = render_index(&SessionState::logged_out(3, true));
        assert!(html.contains(r#""attempt":3"#));
        assert!(html.contains(r#""phase":"logged_out""#));
        assert!(!html.contains("{{STATE}}"));
    }

    #[test]
    fn embedded_state_cannot_close_the_script_tag() {
        let state = SessionState {
            attempt: 1,
            resumable: false,
            phase: SessionPhase::LoginError {
                message: "</script><script>alert(1)</script>".to_string(),
                kind: FailureKind::Transport,
            },
        };
        let html = render_index(&state);
        assert!(!html.contains("</script><script>alert(1)"));
        assert!(html.contains(r#"<\/script>"#));
    }
}
